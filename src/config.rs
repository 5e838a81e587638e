//! Configuration file for the `medatlas` tool
//!
//! ```yaml
//! db: /var/lib/medatlas/atlas.db
//! log_level: info
//! policy:
//!   allow_self_loops: true
//!   self_loops:
//!     subject: false
//! ```

use crate::graph::GraphPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unsupported log level: {0}")]
    LogLevel(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasConfig {
    /// SQLite database path; defaults to [`default_db_path`]
    #[serde(default)]
    pub db: Option<PathBuf>,
    /// One of trace, debug, info, warn, error
    #[serde(default)]
    pub log_level: Option<String>,
    /// Policy applied to graphs created or imported by the tool
    #[serde(default)]
    pub policy: GraphPolicy,
}

impl AtlasConfig {
    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: AtlasConfig = serde_yaml::from_str(yaml)?;
        if let Some(level) = &config.log_level {
            parse_level(level)?;
        }
        Ok(config)
    }

    /// Read and parse a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Database path, falling back to the per-user default
    pub fn db_path(&self) -> PathBuf {
        self.db.clone().unwrap_or_else(default_db_path)
    }
}

/// Parse a log level name
pub fn parse_level(level: &str) -> Result<tracing::Level, ConfigError> {
    level
        .parse::<tracing::Level>()
        .map_err(|_| ConfigError::LogLevel(level.to_string()))
}

/// Get the default database path (~/.local/share/medatlas/atlas.db)
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("medatlas").join("atlas.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = AtlasConfig::from_yaml("{}").unwrap();
        assert_eq!(config, AtlasConfig::default());
        assert!(config.policy.permits_self_loop("subject"));
    }

    #[test]
    fn parses_full_document() {
        let yaml = r#"
db: /tmp/atlas.db
log_level: debug
policy:
  allow_self_loops: false
  self_loops:
    same_as: true
"#;
        let config = AtlasConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.db_path(), PathBuf::from("/tmp/atlas.db"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.policy.permits_self_loop("same_as"));
        assert!(!config.policy.permits_self_loop("subject"));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let err = AtlasConfig::from_yaml("log_level: chatty").unwrap_err();
        assert!(matches!(err, ConfigError::LogLevel(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AtlasConfig::load(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
