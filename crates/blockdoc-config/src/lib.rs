use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Undo/redo batching and depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Inactivity gap (ms) that closes an undo batch
    pub batch_window_ms: u64,
    /// Oldest batches beyond this are dropped
    pub max_batches: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            batch_window_ms: 300,
            max_batches: 500,
        }
    }
}

impl HistoryConfig {
    pub fn batch_window(&self) -> Duration {
        Duration::from_millis(self.batch_window_ms)
    }
}

/// Virtualized layout constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Height used for blocks that have not been measured yet
    pub estimated_block_height: f64,
    /// Extra blocks materialized on each side of the visible window
    pub overscan: usize,
    /// Documents with more blocks than this are virtualized
    pub virtualization_threshold: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            estimated_block_height: 24.0,
            overscan: 5,
            virtualization_threshold: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    pub debounce_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self { debounce_ms: 1000 }
    }
}

impl AutosaveConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Tuning knobs for the document engine. Every section is optional in the
/// TOML file; missing values fall back to the defaults above.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub history: HistoryConfig,
    pub viewport: ViewportConfig,
    pub autosave: AutosaveConfig,
}

impl EngineConfig {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: EngineConfig =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/blockdoc");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = EngineConfig::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/blockdoc/config.toml"));
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();

        assert_eq!(config.history.batch_window(), Duration::from_millis(300));
        assert_eq!(config.history.max_batches, 500);
        assert_eq!(config.viewport.overscan, 5);
        assert_eq!(config.viewport.virtualization_threshold, 50);
        assert_eq!(config.autosave.debounce(), Duration::from_millis(1000));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut original = EngineConfig::default();
        original.history.batch_window_ms = 150;
        original.viewport.estimated_block_height = 32.5;

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: EngineConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config_content = r#"
[viewport]
overscan = 10
"#;

        let config: EngineConfig = toml::from_str(config_content).unwrap();

        assert_eq!(config.viewport.overscan, 10);
        assert_eq!(config.viewport.virtualization_threshold, 50);
        assert_eq!(config.history, HistoryConfig::default());
        assert_eq!(config.autosave, AutosaveConfig::default());
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = EngineConfig::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_toml_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[history\nbatch_window_ms = ").unwrap();

        let err = EngineConfig::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let mut test_config = EngineConfig::default();
        test_config.autosave.debounce_ms = 2500;

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = EngineConfig::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }
}
