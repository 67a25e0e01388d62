//! Error types for Hoard
//!
//! Three layers:
//! - [`FetchError`] is what loaders return from the engine side.
//! - [`LoadError`] is what the cache hands back to callers. It is `Clone` so a
//!   single load outcome can be delivered to every waiter.
//! - [`HoardError`] covers everything else (config, IO, serialization) and
//!   wraps the other two for the binary.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for loader operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type alias for cache operations
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type alias for Hoard operations
pub type HoardResult<T> = Result<T, HoardError>;

/// Errors raised by an asset loader
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request to {url} failed: {reason}")]
    Http {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("Invalid asset path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("{loader} does not support {operation}")]
    Unsupported {
        loader: &'static str,
        operation: &'static str,
    },

    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an HTTP error
    pub fn http(url: impl Into<String>, status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            status,
            reason: reason.into(),
        }
    }

    /// Whether this error means the resource does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            Self::Http { status, .. } => *status == Some(404),
            _ => false,
        }
    }
}

/// Errors surfaced by the keyed cache
#[derive(Error, Debug, Clone)]
pub enum LoadError {
    #[error("Invalid asset key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Failed to load {key}: {source}")]
    LoadFailed {
        key: String,
        #[source]
        source: Arc<FetchError>,
    },

    #[error("Trying to unload {0} that was not loaded")]
    NotLoaded(String),

    #[error("Load of {0} was cancelled before it completed")]
    Cancelled(String),

    #[error("Asset cache has been disposed")]
    Disposed,

    #[error("No tokio runtime available to drive asset loads")]
    NoRuntime,
}

impl LoadError {
    /// Map a loader failure for `key` into the cache taxonomy
    pub fn from_fetch(key: impl Into<String>, err: FetchError) -> Self {
        let key = key.into();
        if err.is_not_found() {
            Self::NotFound(key)
        } else {
            Self::LoadFailed {
                key,
                source: Arc::new(err),
            }
        }
    }

    /// Check if a later attempt could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::LoadFailed { source, .. } => {
                matches!(**source, FetchError::Io { .. } | FetchError::Http { .. })
            }
            Self::Cancelled(_) => true,
            _ => false,
        }
    }
}

/// All errors that can occur in Hoard
#[derive(Error, Debug)]
pub enum HoardError {
    // Cache errors
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No remote base URL configured")]
    RemoteNotConfigured,

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl HoardError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Load(err) => err.is_retryable(),
            Self::Fetch(FetchError::Io { .. } | FetchError::Http { .. }) => true,
            _ => false,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::RemoteNotConfigured => {
                Some("Pass --base-url or run: hoard config init and set remote.base_url")
            }
            Self::Load(LoadError::NotFound(_)) => {
                Some("Check the asset root (--root) and scope (--scope)")
            }
            Self::Load(LoadError::InvalidKey { .. }) => {
                Some("Asset keys must be non-empty and free of control characters")
            }
            Self::ConfigInvalid { .. } => Some("Run: hoard config init --force"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = HoardError::from(LoadError::NotFound("hero".to_string()));
        assert!(err.to_string().contains("Asset not found: hero"));
    }

    #[test]
    fn error_hint() {
        let err = HoardError::RemoteNotConfigured;
        assert!(err.hint().unwrap().contains("--base-url"));
        assert_eq!(HoardError::PathNotFound(PathBuf::from("x")).hint(), None);
    }

    #[test]
    fn error_retryable() {
        let io = FetchError::io(
            "reading",
            std::io::Error::new(std::io::ErrorKind::TimedOut, "slow disk"),
        );
        assert!(LoadError::from_fetch("hero", io).is_retryable());
        assert!(!LoadError::Disposed.is_retryable());
        assert!(!HoardError::RemoteNotConfigured.is_retryable());
    }

    #[test]
    fn not_found_variants_collapse() {
        let io = FetchError::io(
            "opening",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(
            LoadError::from_fetch("a", io),
            LoadError::NotFound(k) if k == "a"
        ));
        let http = FetchError::http("http://x/a", Some(404), "status 404");
        assert!(matches!(
            LoadError::from_fetch("a", http),
            LoadError::NotFound(_)
        ));
        let http = FetchError::http("http://x/a", Some(500), "status 500");
        assert!(matches!(
            LoadError::from_fetch("a", http),
            LoadError::LoadFailed { .. }
        ));
    }
}
