//! Runtime Configuration
//!
//! Settings come from defaults, a JSON file managed by [`ConfigManager`] and
//! `CARBON_TRACE_*` environment variables (a `.env` file is honoured).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::warn;

use crate::codec::token::DEFAULT_COMPRESSION_LEVEL;
use crate::error::Result;
use crate::model::events::DEFAULT_EVENT_CAPACITY;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TraceConfig {
    /// Default `tracing` filter, overridden by `RUST_LOG`.
    pub log_filter: String,
    /// zstd level for simulation tokens (1-22).
    pub token_compression_level: i32,
    /// Drop analysis warnings identical to an earlier one.
    pub dedupe_warnings: bool,
    /// Buffered events per tree node before slow subscribers lag.
    pub event_capacity: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            log_filter: "carbon_trace=info".to_string(),
            token_compression_level: DEFAULT_COMPRESSION_LEVEL,
            dedupe_warnings: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl TraceConfig {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(filter) = std::env::var("CARBON_TRACE_LOG") {
            self.log_filter = filter;
        }
        if let Some(level) = parse_var("CARBON_TRACE_COMPRESSION_LEVEL") {
            self.token_compression_level = level;
        }
        if let Some(dedupe) = parse_var("CARBON_TRACE_DEDUPE_WARNINGS") {
            self.dedupe_warnings = dedupe;
        }
        if let Some(capacity) = parse_var("CARBON_TRACE_EVENT_CAPACITY") {
            self.event_capacity = capacity;
        }
        self
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value '{}' of {}", raw, name);
            None
        }
    }
}

/// Loads and saves a [`TraceConfig`] as pretty JSON.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the file, writing the defaults first if it does not exist.
    pub async fn load(&self) -> Result<TraceConfig> {
        if !self.path.exists() {
            let default = TraceConfig::default();
            self.save(&default).await?;
            return Ok(default);
        }
        let content = fs::read_to_string(&self.path).await?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub async fn save(&self, config: &TraceConfig) -> Result<()> {
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let manager = ConfigManager::new(temp_file.path());

        let config = TraceConfig {
            log_filter: "carbon_trace=debug".to_string(),
            token_compression_level: 3,
            dedupe_warnings: false,
            event_capacity: 64,
        };
        manager.save(&config).await.unwrap();
        assert_eq!(manager.load().await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_config_load_writes_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("carbon_trace.json");
        let manager = ConfigManager::new(path.clone());

        assert_eq!(manager.load().await.unwrap(), TraceConfig::default());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_partial_file_keeps_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("partial.json");
        tokio::fs::write(&path, r#"{"event_capacity": 4}"#).await.unwrap();

        let config = ConfigManager::new(path).load().await.unwrap();
        assert_eq!(config.event_capacity, 4);
        assert_eq!(config.token_compression_level, DEFAULT_COMPRESSION_LEVEL);
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("CARBON_TRACE_COMPRESSION_LEVEL", "7");
        std::env::set_var("CARBON_TRACE_DEDUPE_WARNINGS", "not-a-bool");
        let config = TraceConfig::default().with_env_overrides();
        std::env::remove_var("CARBON_TRACE_COMPRESSION_LEVEL");
        std::env::remove_var("CARBON_TRACE_DEDUPE_WARNINGS");
        assert_eq!(config.token_compression_level, 7);
        assert!(config.dedupe_warnings);
    }
}
