//! Browsing preferences (spec component C12, ambient).
//!
//! Loaded through `serde`/`toml`, the way the teacher's config layer works:
//! a missing or malformed file is not a hard failure, it falls back to
//! defaults with a logged warning.

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrowseConfig {
    pub pages: u8,
    pub shift: bool,
    pub rtl: bool,
    pub worker_threads: usize,
    pub log_level: String,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            pages: 1,
            shift: false,
            rtl: false,
            worker_threads: 0,
            log_level: "info".to_string(),
        }
    }
}

impl BrowseConfig {
    /// Never fails: a missing or malformed file logs a warning and falls
    /// back to [`BrowseConfig::default`].
    pub fn load_or_default(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "malformed config; using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read config; using defaults");
                Self::default()
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = BrowseConfig::load_or_default(std::path::Path::new("/nonexistent/path.toml"));
        assert_eq!(config, BrowseConfig::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not valid toml {{{").unwrap();
        let config = BrowseConfig::load_or_default(&path);
        assert_eq!(config, BrowseConfig::default());
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = BrowseConfig {
            pages: 2,
            shift: true,
            rtl: true,
            worker_threads: 4,
            log_level: "debug".to_string(),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
        assert_eq!(BrowseConfig::load_or_default(&path), config);
    }
}
