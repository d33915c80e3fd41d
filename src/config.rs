//! Process configuration read from the environment.

use crate::error::{RedactorError, RedactorResult};
use std::path::PathBuf;
use tracing::Level;

pub const DEFAULT_STORAGE_DRIVER: &str = "local";
pub const DEFAULT_LOCAL_STORAGE_PATH: &str = "/tmp/pdf-storage";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `STORAGE_DRIVER`; only `local` is implemented.
    pub storage_driver: String,
    /// `LOCAL_STORAGE_PATH`
    pub local_storage_path: PathBuf,
    /// `REDACTOR_WORK_DIR`; scratch space for URI round trips.
    pub work_dir: PathBuf,
    /// `REDACTOR_LOG`
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_driver: DEFAULT_STORAGE_DRIVER.to_string(),
            local_storage_path: PathBuf::from(DEFAULT_LOCAL_STORAGE_PATH),
            work_dir: std::env::temp_dir(),
            log_level: Level::INFO,
        }
    }
}

impl Config {
    pub fn from_env() -> RedactorResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> RedactorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let log_level = match get("REDACTOR_LOG") {
            Some(raw) => parse_level(&raw)?,
            None => defaults.log_level,
        };

        Ok(Self {
            storage_driver: get("STORAGE_DRIVER")
                .map(|v| v.trim().to_ascii_lowercase())
                .unwrap_or(defaults.storage_driver),
            local_storage_path: get("LOCAL_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.local_storage_path),
            work_dir: get("REDACTOR_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            log_level,
        })
    }
}

pub fn parse_level(raw: &str) -> RedactorResult<Level> {
    raw.trim().parse::<Level>().map_err(|_| RedactorError::Config {
        key: "REDACTOR_LOG".to_string(),
        reason: format!("unknown log level '{}'", raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.storage_driver, "local");
        assert_eq!(config.local_storage_path, PathBuf::from("/tmp/pdf-storage"));
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let config = Config::from_lookup(lookup(&[
            ("STORAGE_DRIVER", "S3"),
            ("LOCAL_STORAGE_PATH", "  "),
            ("REDACTOR_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.storage_driver, "s3");
        assert_eq!(config.local_storage_path, PathBuf::from("/tmp/pdf-storage"));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn test_bad_log_level() {
        let err = Config::from_lookup(lookup(&[("REDACTOR_LOG", "loud")])).unwrap_err();
        assert!(err.to_string().contains("REDACTOR_LOG"));
    }
}
