//! Configuration loading and typed config structures.
//!
//! Configuration is optional. It is read from the file named by
//! `DETINT_CONFIG`, or from `detint.yaml` in the working directory when that
//! variable is unset. A missing file means every setting takes its default.
//! Run physics (geometry, couplings, seed) always comes from the event file
//! header, never from here.

use std::path::{Path, PathBuf};

use detint_kinematics::KinematicsSettings;
use serde::Deserialize;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "DETINT_CONFIG";

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "detint.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An override carried a value that cannot be used.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// The setting or variable name.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DetintConfig {
    /// Elastic model tuning.
    #[serde(default)]
    pub kinematics: KinematicsSettings,

    /// Output table and progress reporting.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DetintConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Locate and load the configuration, then apply environment overrides.
    ///
    /// `lookup` resolves environment variables; pass
    /// `|key| std::env::var(key).ok()` in production.
    ///
    /// Environment variables:
    /// - `DETINT_CONFIG` -- configuration file path (must exist when set)
    /// - `DETINT_TABLE_PATH` -- overrides `output.table_path`
    /// - `DETINT_LOG_FORMAT` -- overrides `logging.format` (`pretty` or `json`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicitly named file cannot be read,
    /// any file present cannot be parsed, or an override is invalid.
    pub fn load(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Apply environment overrides on top of file values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown log format.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup("DETINT_TABLE_PATH") {
            self.output.table_path = if path.is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }
        if let Some(format) = lookup("DETINT_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }
        Ok(())
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Where to write the per-interaction table (JSON lines). Disabled when
    /// unset.
    #[serde(default)]
    pub table_path: Option<PathBuf>,

    /// Log progress every this many events. Zero disables progress logs.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            table_path: None,
            progress_interval: default_progress_interval(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log line format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidValue {
                key: "logging.format".to_owned(),
                reason: format!("expected pretty or json, got {other}"),
            }),
        }
    }
}

const fn default_progress_interval() -> u64 {
    10_000
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = DetintConfig::parse("").unwrap();
        assert_eq!(config, DetintConfig::default());
        assert_eq!(config.output.progress_interval, 10_000);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn parses_all_sections() {
        let yaml = r"
kinematics:
  alpha_d: 0.1
  integration_points: 64
  electron_recoil_threshold_gev: 0.3
output:
  table_path: interactions.jsonl
  progress_interval: 500
logging:
  format: json
";
        let config = DetintConfig::parse(yaml).unwrap();
        assert!((config.kinematics.alpha_d - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.kinematics.integration_points, 64);
        assert!((config.kinematics.electron_recoil_threshold_gev - 0.3).abs() < f64::EPSILON);
        assert!(config.kinematics.proton_recoil_threshold_gev.abs() < f64::EPSILON);
        assert_eq!(
            config.output.table_path,
            Some(PathBuf::from("interactions.jsonl"))
        );
        assert_eq!(config.output.progress_interval, 500);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = DetintConfig::parse("kinematics: [1, 2");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = DetintConfig::default();
        config
            .apply_overrides(env(&[
                ("DETINT_TABLE_PATH", "/tmp/rows.jsonl"),
                ("DETINT_LOG_FORMAT", "JSON"),
            ]))
            .unwrap();
        assert_eq!(
            config.output.table_path,
            Some(PathBuf::from("/tmp/rows.jsonl"))
        );
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn empty_table_override_disables_table() {
        let mut config = DetintConfig::parse("output:\n  table_path: rows.jsonl\n").unwrap();
        config
            .apply_overrides(env(&[("DETINT_TABLE_PATH", "")]))
            .unwrap();
        assert!(config.output.table_path.is_none());
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let mut config = DetintConfig::default();
        let result = config.apply_overrides(env(&[("DETINT_LOG_FORMAT", "xml")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = DetintConfig::load(env(&[(
            CONFIG_PATH_VAR,
            "/definitely/not/here/detint.yaml",
        )]));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
