//! Local directory loader
//!
//! Key `ui/icons/sword` maps to `<root>/ui/icons/sword` if that file exists,
//! otherwise to the first file (sorted by name) in `<root>/ui/icons` whose
//! stem is `sword`. A group key names a directory; its members are the files
//! directly inside it.

use super::AssetLoader;
use crate::error::{FetchError, FetchResult};
use crate::key::CacheKey;
use crate::progress::Progress;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, trace};

const READ_CHUNK: usize = 64 * 1024;

/// Bytes of a file loaded from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsAsset {
    pub key: String,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl FsAsset {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Loads assets from files under a root directory
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a key maps to, rejecting keys that escape the root.
    ///
    /// The path is rebuilt from normal components only, so `.` segments never
    /// reach `Path::parent` and the result always sits strictly below the root.
    fn key_path(&self, key: &str) -> FetchResult<PathBuf> {
        let invalid = |reason: &str| FetchError::InvalidPath {
            path: key.to_string(),
            reason: reason.to_string(),
        };

        let mut path = self.root.clone();
        let mut depth = 0;
        for component in Path::new(key).components() {
            match component {
                Component::Normal(part) => {
                    path.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(invalid("parent directory references are not allowed"))
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid("absolute paths are not allowed"))
                }
            }
        }
        if depth == 0 {
            return Err(invalid("key does not name anything under the root"));
        }
        Ok(path)
    }

    /// Resolve a key to an existing file, if any
    async fn locate(&self, key: &str) -> FetchResult<Option<PathBuf>> {
        let exact = self.key_path(key)?;
        if is_file(&exact).await {
            return Ok(Some(exact));
        }

        let (Some(dir), Some(stem)) = (exact.parent(), exact.file_name()) else {
            return Ok(None);
        };
        let files = match list_files(dir).await {
            Ok(files) => files,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(FetchError::io(
                    format!("listing {}", dir.display()),
                    err,
                ))
            }
        };
        Ok(files
            .into_iter()
            .find(|path| path.file_stem() == Some(stem)))
    }
}

#[async_trait]
impl AssetLoader for FsLoader {
    type Asset = FsAsset;

    async fn fetch(&self, key: &CacheKey, progress: &Progress) -> FetchResult<Option<FsAsset>> {
        let Some(path) = self.locate(key.name()).await? else {
            debug!("No file for {} under {}", key, self.root.display());
            return Ok(None);
        };

        let bytes = read_with_progress(&path, progress).await?;
        debug!("Read {} ({} bytes) from {}", key, bytes.len(), path.display());
        Ok(Some(FsAsset {
            key: key.name().to_string(),
            path,
            bytes,
        }))
    }

    async fn resolve_group(&self, key: &CacheKey) -> FetchResult<Vec<CacheKey>> {
        let dir = self.key_path(key.name())?;
        let files = list_files(&dir).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(key.name().to_string())
            } else {
                FetchError::io(format!("listing {}", dir.display()), e)
            }
        })?;

        let members = files
            .iter()
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()))
            .map(|stem| key.with_name(format!("{}/{}", key.name(), stem)))
            .collect();
        Ok(members)
    }

    fn release(&self, key: &CacheKey, asset: Arc<FsAsset>) -> FetchResult<()> {
        trace!("Released {} ({} bytes)", key, asset.len());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fs"
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Regular files directly inside `dir`, sorted by name
async fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

async fn read_with_progress(path: &Path, progress: &Progress) -> FetchResult<Vec<u8>> {
    let context = || format!("reading {}", path.display());
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| FetchError::io(context(), e))?;
    let total = file
        .metadata()
        .await
        .map_err(|e| FetchError::io(context(), e))?
        .len();

    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = file
            .read(&mut chunk)
            .await
            .map_err(|e| FetchError::io(context(), e))?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
        progress.report_bytes(bytes.len() as u64, Some(total));
    }
    if total == 0 {
        progress.finish();
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let enemies = dir.path().join("enemies");
        std::fs::create_dir_all(&enemies).unwrap();
        std::fs::write(enemies.join("troll.json"), b"{\"hp\":40}").unwrap();
        std::fs::write(enemies.join("orc.json"), b"{\"hp\":10}").unwrap();
        std::fs::create_dir_all(enemies.join("bosses")).unwrap();
        std::fs::write(dir.path().join("hero.txt"), b"hero").unwrap();
        dir
    }

    fn key(name: &str) -> CacheKey {
        CacheKey::parse(name).unwrap()
    }

    #[tokio::test]
    async fn fetches_by_exact_path_or_stem() {
        let dir = fixture();
        let loader = FsLoader::new(dir.path());

        let exact = loader
            .fetch(&key("hero.txt"), &Progress::none())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(exact.bytes, b"hero");

        let by_stem = loader
            .fetch(&key("enemies/orc"), &Progress::none())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_stem.path, dir.path().join("enemies/orc.json"));
        assert_eq!(by_stem.key, "enemies/orc");
    }

    #[tokio::test]
    async fn missing_files_are_none() {
        let dir = fixture();
        let loader = FsLoader::new(dir.path());

        let none = Progress::none();
        assert!(loader.fetch(&key("dragon"), &none).await.unwrap().is_none());
        assert!(loader.fetch(&key("nope/dragon"), &none).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_paths_outside_root() {
        let dir = fixture();
        let loader = FsLoader::new(dir.path().join("enemies"));

        let err = loader
            .fetch(&key("../hero.txt"), &Progress::none())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidPath { .. }));
        assert!(loader
            .fetch(&key("/etc/passwd"), &Progress::none())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn dot_keys_stay_inside_root() {
        let dir = fixture();
        std::fs::write(dir.path().join("enemies.secret"), b"outside").unwrap();
        let root = dir.path().join("enemies");
        let loader = FsLoader::new(&root);

        for name in [".", "./", "./."] {
            let err = loader.fetch(&key(name), &Progress::none()).await.unwrap_err();
            assert!(matches!(err, FetchError::InvalidPath { .. }), "{}: {:?}", name, err);
        }
        assert!(matches!(
            loader.resolve_group(&key(".")).await,
            Err(FetchError::InvalidPath { .. })
        ));

        // Trailing dots collapse onto the named entry, never its parent's siblings
        let orc = loader
            .fetch(&key("orc/."), &Progress::none())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(orc.path, root.join("orc.json"));
        assert!(orc.path.starts_with(&root));
    }

    #[tokio::test]
    async fn groups_list_sorted_files() {
        let dir = fixture();
        let loader = FsLoader::new(dir.path());

        let members = loader.resolve_group(&key("enemies")).await.unwrap();
        let names: Vec<&str> = members.iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["enemies/orc", "enemies/troll"]);

        let err = loader.resolve_group(&key("villains")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn reports_read_progress() {
        let dir = fixture();
        let loader = FsLoader::new(dir.path());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |v| sink.lock().unwrap().push(v));

        loader.fetch(&key("hero"), &progress).await.unwrap().unwrap();
        assert_eq!(seen.lock().unwrap().last(), Some(&1.0));
    }
}
