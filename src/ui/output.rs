//! Output functions for consistent CLI formatting
//!
//! Everything here is suppressed in JSON mode so stdout stays parseable.

use super::context::UiContext;
use console::style;

/// Display intro banner
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.is_json() {
        return;
    }
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).cyan().bold()).ok();
    } else {
        println!("{}", style(title).cyan().bold());
        println!();
    }
}

/// Display success outro
pub fn outro_success(ctx: &UiContext, message: &str) {
    if ctx.is_json() {
        return;
    }
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).green().bold()).ok();
    } else {
        println!();
        println!("{} {}", style("[OK]").green(), message);
    }
}

/// Display warning outro
pub fn outro_warn(ctx: &UiContext, message: &str) {
    if ctx.is_json() {
        return;
    }
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).yellow().bold()).ok();
    } else {
        println!();
        println!("{} {}", style("[WARN]").yellow(), message);
    }
}

/// Display a section header
pub fn section(ctx: &UiContext, title: &str) {
    if ctx.is_json() {
        return;
    }
    if ctx.use_fancy_output() {
        println!();
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!();
        println!("{}", style(title).bold());
    }
}

/// Display a success step
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.is_json() {
        return;
    }
    if ctx.use_fancy_output() {
        cliclack::log::success(message).ok();
    } else {
        println!("  {} {}", style("[OK]").green(), message);
    }
}

/// Display a success step with detail
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.is_json() {
        return;
    }
    if ctx.use_fancy_output() {
        cliclack::log::success(format!("{} ({})", message, style(detail).dim())).ok();
    } else {
        println!("  {} {} ({})", style("[OK]").green(), message, detail);
    }
}

/// Display a warning step with hint
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    if ctx.is_json() {
        return;
    }
    if ctx.use_fancy_output() {
        cliclack::log::warning(format!("{} - {}", message, style(hint).dim())).ok();
    } else {
        println!("  {} {} - {}", style("[WARN]").yellow(), message, hint);
    }
}

/// Display an error step with detail
pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.is_json() {
        return;
    }
    if ctx.use_fancy_output() {
        cliclack::log::error(format!("{}: {}", message, style(detail).red())).ok();
    } else {
        println!("  {} {}: {}", style("[FAIL]").red(), message, detail);
    }
}

/// Display a remark/hint
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.is_json() {
        return;
    }
    if ctx.use_fancy_output() {
        cliclack::log::remark(message).ok();
    } else {
        println!("  {}", style(message).dim());
    }
}

/// Print styled key-value pair
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.is_json() {
        return;
    }
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_non_interactive() {
        let ctx = UiContext::non_interactive();
        // These should not panic
        intro(&ctx, "Test");
        outro_success(&ctx, "Done");
        step_ok(&ctx, "Step completed");
        step_warn_hint(&ctx, "Warning", "try again");
        step_error_detail(&ctx, "Error", "detail");
        key_value(&ctx, "loaded", "3");
    }
}
