//! CLI argument definitions for the Murmur application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use murmur_core::config::MurmurConfig;

/// Murmur is a continuous dictation host for the terminal.
#[derive(Parser, Debug)]
#[command(name = "murmur", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Silence window in milliseconds before an idle listen cycle is recycled.
    #[arg(long = "silence-timeout-ms")]
    pub silence_timeout_ms: Option<u64>,

    /// Language model for recognition (free_form, web_search).
    #[arg(short = 'm', long = "language-model")]
    pub language_model: Option<String>,

    /// Consecutive recognizer errors tolerated before giving up (0 = unbounded).
    #[arg(long = "max-failures")]
    pub max_failures: Option<u32>,

    /// Pause in milliseconds between a recognizer error and the restart.
    #[arg(long = "restart-delay-ms")]
    pub restart_delay_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > MURMUR_CONFIG env var > platform default (~/.murmur/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("MURMUR_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > RUST_LOG env var > config file value.
    /// Returns `None` if not overridden on the command line.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }

    /// Overlay command-line overrides onto the loaded configuration.
    pub fn apply_overrides(&self, config: &mut MurmurConfig) {
        if let Some(timeout) = self.silence_timeout_ms {
            config.dictation.silence_timeout_ms = timeout;
        }
        if let Some(ref model) = self.language_model {
            config.dictation.language_model = model.clone();
        }
        if let Some(max) = self.max_failures {
            config.dictation.max_consecutive_failures = max;
        }
        if let Some(delay) = self.restart_delay_ms {
            config.dictation.restart_delay_ms = delay;
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".murmur").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".murmur").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::try_parse_from([
            "murmur",
            "--silence-timeout-ms",
            "1500",
            "--language-model",
            "web_search",
            "--max-failures",
            "5",
        ])
        .unwrap();

        assert_eq!(args.silence_timeout_ms, Some(1500));
        assert_eq!(args.language_model.as_deref(), Some("web_search"));
        assert_eq!(args.max_failures, Some(5));
        assert_eq!(args.restart_delay_ms, None);
    }

    #[test]
    fn test_apply_overrides() {
        let args = CliArgs::try_parse_from([
            "murmur",
            "--silence-timeout-ms",
            "1500",
            "--max-failures",
            "5",
            "--log-level",
            "debug",
        ])
        .unwrap();

        let mut config = MurmurConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.dictation.silence_timeout_ms, 1500);
        assert_eq!(config.dictation.max_consecutive_failures, 5);
        assert_eq!(config.general.log_level, "debug");
        // Untouched fields keep their configured values.
        assert_eq!(config.dictation.language_model, "free_form");
        assert_eq!(config.dictation.restart_delay_ms, 0);
    }

    #[test]
    fn test_no_overrides_leaves_config_alone() {
        let args = CliArgs::try_parse_from(["murmur"]).unwrap();
        let mut config = MurmurConfig::default();
        args.apply_overrides(&mut config);

        let defaults = MurmurConfig::default();
        assert_eq!(
            config.dictation.silence_timeout_ms,
            defaults.dictation.silence_timeout_ms
        );
        assert_eq!(config.dictation.language_model, defaults.dictation.language_model);
        assert_eq!(
            config.dictation.max_consecutive_failures,
            defaults.dictation.max_consecutive_failures
        );
        assert_eq!(config.general.log_level, defaults.general.log_level);
    }
}
