//! Object storage addressed by `<scheme>://<bucket>/<path>` URIs.

use crate::config::Config;
use crate::error::{RedactorError, RedactorResult};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A parsed storage URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageUri {
    pub scheme: String,
    pub bucket: String,
    /// Object key, without a leading `/`.
    pub path: String,
}

impl StorageUri {
    pub fn parse(uri: &str) -> RedactorResult<Self> {
        let invalid = |reason: &str| RedactorError::Storage {
            uri: uri.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| invalid("missing '<scheme>://'"))?;
        if scheme.is_empty() {
            return Err(invalid("empty scheme"));
        }

        let (bucket, path) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(invalid("empty bucket"));
        }
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return Err(invalid("empty object path"));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            bucket: bucket.to_string(),
            path: path.to_string(),
        })
    }

    /// Last path segment, used to name scratch files.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

impl fmt::Display for StorageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.scheme, self.bucket, self.path)
    }
}

/// Moves objects between storage and the local filesystem.
pub trait StorageDriver {
    fn download(&self, uri: &StorageUri, dest: &Path) -> RedactorResult<()>;

    fn upload(&self, src: &Path, uri: &StorageUri) -> RedactorResult<()>;

    fn name(&self) -> &str;
}

/// Objects kept under a root directory as `<root>/<path>`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, uri: &StorageUri) -> RedactorResult<PathBuf> {
        if uri.path.split('/').any(|segment| segment == "..") {
            return Err(RedactorError::Storage {
                uri: uri.to_string(),
                reason: "path escapes the storage root".to_string(),
            });
        }
        Ok(self.root.join(&uri.path))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> RedactorError {
    RedactorError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl StorageDriver for LocalStorage {
    fn download(&self, uri: &StorageUri, dest: &Path) -> RedactorResult<()> {
        let src = self.resolve(uri)?;
        if !src.is_file() {
            return Err(RedactorError::Storage {
                uri: uri.to_string(),
                reason: format!("no object at {}", src.display()),
            });
        }
        fs::copy(&src, dest).map_err(|e| io_error(dest, e))?;
        debug!(%uri, from = %src.display(), "downloaded");
        Ok(())
    }

    fn upload(&self, src: &Path, uri: &StorageUri) -> RedactorResult<()> {
        let dest = self.resolve(uri)?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        fs::copy(src, &dest).map_err(|e| io_error(&dest, e))?;
        debug!(%uri, to = %dest.display(), "uploaded");
        Ok(())
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// Builds the driver named by `STORAGE_DRIVER`.
pub fn driver_from_config(config: &Config) -> RedactorResult<Box<dyn StorageDriver>> {
    match config.storage_driver.as_str() {
        "local" => Ok(Box::new(LocalStorage::new(&config.local_storage_path))),
        other => Err(RedactorError::Config {
            key: "STORAGE_DRIVER".to_string(),
            reason: format!("unsupported driver '{}'", other),
        }),
    }
}
