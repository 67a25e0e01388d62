//! Get command - fetch a single URL

use super::http_client;
use crate::cli::args::GetArgs;
use crate::config::Config;
use crate::error::{HoardError, HoardResult};
use crate::external::ExternalAssets;
use crate::progress::Progress;
use crate::ui::{self, TransferProgress, UiContext};
use std::io::Write;

/// Execute the get command
pub async fn execute(args: GetArgs, config: &Config) -> HoardResult<()> {
    let assets = ExternalAssets::new(http_client(config));

    if let Some(output) = &args.output {
        let ctx = UiContext::detect();
        let bar = TransferProgress::new(&ctx, &args.url);
        let result = assets
            .download_file(&args.url, output, !args.no_cache, bar.reporter())
            .await;
        bar.finish();
        result?;
        ui::step_ok_detail(&ctx, "Saved", &output.display().to_string());
        return Ok(());
    }

    // Body goes to stdout, so no decorations
    let body = if args.text {
        assets.download_text(&args.url, !args.no_cache, Progress::none()).await?
    } else {
        assets.download_bytes(&args.url, !args.no_cache, Progress::none()).await?
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(body.bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| HoardError::io("writing response to stdout", e))?;

    assets.dispose();
    Ok(())
}
