use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MurmurError, Result};

/// Top-level configuration for the Murmur application.
///
/// Loaded from `~/.murmur/config.toml` by default. Each section corresponds
/// to a bounded context or cross-cutting concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MurmurConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub dictation: DictationConfig,
}

impl Default for MurmurConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            dictation: DictationConfig::default(),
        }
    }
}

impl MurmurConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MurmurConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MurmurError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Dictation loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictationConfig {
    /// Milliseconds the recognizer may wait for speech before the listen
    /// cycle is treated as timed out and recycled.
    pub silence_timeout_ms: u64,
    /// Recognition language model: "free_form" or "web_search".
    pub language_model: String,
    /// Consecutive recoverable failures tolerated before dictation stops.
    /// Zero means retry without limit.
    pub max_consecutive_failures: u32,
    /// Milliseconds to wait before each automatic restart.
    pub restart_delay_ms: u64,
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self {
            silence_timeout_ms: 3000,
            language_model: "free_form".to_string(),
            max_consecutive_failures: 0,
            restart_delay_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = MurmurConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.dictation.silence_timeout_ms, 3000);
        assert_eq!(config.dictation.language_model, "free_form");
        assert_eq!(config.dictation.max_consecutive_failures, 0);
        assert_eq!(config.dictation.restart_delay_ms, 0);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
log_level = "debug"

[dictation]
silence_timeout_ms = 5000
language_model = "web_search"
max_consecutive_failures = 3
restart_delay_ms = 250
"#;
        let file = create_temp_config(content);
        let config = MurmurConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.dictation.silence_timeout_ms, 5000);
        assert_eq!(config.dictation.language_model, "web_search");
        assert_eq!(config.dictation.max_consecutive_failures, 3);
        assert_eq!(config.dictation.restart_delay_ms, 250);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[dictation]
silence_timeout_ms = 1500
"#;
        let file = create_temp_config(content);
        let config = MurmurConfig::load(file.path()).unwrap();
        assert_eq!(config.dictation.silence_timeout_ms, 1500);
        // Remaining fields use defaults
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.dictation.language_model, "free_form");
        assert_eq!(config.dictation.max_consecutive_failures, 0);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = MurmurConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.dictation.silence_timeout_ms, 3000);
    }

    #[test]
    fn test_load_invalid_toml_is_error() {
        let content = "this is {{ not valid TOML";
        let file = create_temp_config(content);
        let result = MurmurConfig::load(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_invalid_toml_uses_defaults() {
        let content = "dictation = [[[";
        let file = create_temp_config(content);
        let config = MurmurConfig::load_or_default(file.path());
        assert_eq!(config.dictation.silence_timeout_ms, 3000);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = MurmurConfig::default();
        config.dictation.silence_timeout_ms = 4500;
        config.dictation.max_consecutive_failures = 5;
        config.save(&path).unwrap();

        let reloaded = MurmurConfig::load(&path).unwrap();
        assert_eq!(reloaded.general.log_level, config.general.log_level);
        assert_eq!(reloaded.dictation.silence_timeout_ms, 4500);
        assert_eq!(reloaded.dictation.max_consecutive_failures, 5);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("dir").join("config.toml");

        let config = MurmurConfig::default();
        config.save(&path).unwrap();

        assert!(path.exists());
        let reloaded = MurmurConfig::load(&path).unwrap();
        assert_eq!(reloaded.general.log_level, "info");
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let content = "";
        let file = create_temp_config(content);
        let config = MurmurConfig::load(file.path()).unwrap();

        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.dictation.silence_timeout_ms, 3000);
        assert_eq!(config.dictation.restart_delay_ms, 0);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = MurmurConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let deserialized: MurmurConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.general.log_level, config.general.log_level);
        assert_eq!(
            deserialized.dictation.silence_timeout_ms,
            config.dictation.silence_timeout_ms
        );
        assert_eq!(
            deserialized.dictation.language_model,
            config.dictation.language_model
        );
    }

    #[test]
    fn test_sub_config_defaults() {
        let general = GeneralConfig::default();
        assert_eq!(general.log_level, "info");

        let dictation = DictationConfig::default();
        assert_eq!(dictation.silence_timeout_ms, 3000);
        assert_eq!(dictation.language_model, "free_form");
        assert_eq!(dictation.max_consecutive_failures, 0);
        assert_eq!(dictation.restart_delay_ms, 0);
    }
}
