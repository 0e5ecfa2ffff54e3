use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{AppError, AppResult};
use crate::models::Column;
use crate::services::columns::{parse_columns, DEFAULT_LEADING_COLUMNS};

/// Startup delay used inside containers so the data volume can mount.
const DOCKER_STARTUP_DELAY_MS: u64 = 5000;
/// Pause before clearing the output directory inside containers.
const DOCKER_OUTPUT_SETTLE_MS: u64 = 100;

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory containing the forecast JSON files.
    pub input_dir: PathBuf,
    /// Directory that receives the workbooks. Cleared on every run.
    pub output_dir: PathBuf,
    pub leading_columns: Vec<Column>,
    pub startup_delay: Duration,
    pub output_settle_delay: Duration,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./data"),
            output_dir: PathBuf::from("./output"),
            leading_columns: DEFAULT_LEADING_COLUMNS.to_vec(),
            startup_delay: Duration::ZERO,
            output_settle_delay: Duration::ZERO,
            log_json: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let in_docker = lookup("IS_DOCKER").is_some_and(|v| !v.is_empty());
        let defaults = Self::default();

        let leading_columns = match lookup("LEADING_COLUMNS") {
            Some(list) => parse_columns(&list)?,
            None => defaults.leading_columns,
        };

        Ok(Self {
            input_dir: lookup("INPUT_DIR").map_or(defaults.input_dir, PathBuf::from),
            output_dir: lookup("OUTPUT_DIR").map_or(defaults.output_dir, PathBuf::from),
            leading_columns,
            startup_delay: millis(
                &lookup,
                "STARTUP_DELAY_MS",
                if in_docker { DOCKER_STARTUP_DELAY_MS } else { 0 },
            )?,
            output_settle_delay: millis(
                &lookup,
                "OUTPUT_SETTLE_MS",
                if in_docker { DOCKER_OUTPUT_SETTLE_MS } else { 0 },
            )?,
            log_json: lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> AppResult<Duration> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Duration::from_millis)
            .map_err(|_| AppError::Config(format!("{} must be a number of milliseconds", key))),
        None => Ok(Duration::from_millis(default)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppResult<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = config(&[]).unwrap();

        assert_eq!(config.input_dir, PathBuf::from("./data"));
        assert_eq!(config.output_dir, PathBuf::from("./output"));
        assert_eq!(config.leading_columns, vec![Column::Province, Column::Municipality]);
        assert_eq!(config.startup_delay, Duration::ZERO);
        assert_eq!(config.output_settle_delay, Duration::ZERO);
        assert!(!config.log_json);
    }

    #[test]
    fn test_docker_defaults() {
        let config = config(&[("IS_DOCKER", "1")]).unwrap();
        assert_eq!(config.startup_delay, Duration::from_millis(5000));
        assert_eq!(config.output_settle_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_explicit_delay_overrides_docker() {
        let config = config(&[("IS_DOCKER", "true"), ("STARTUP_DELAY_MS", "250")]).unwrap();
        assert_eq!(config.startup_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("INPUT_DIR", "/mnt/forecasts"),
            ("OUTPUT_DIR", "/mnt/excel"),
            ("LEADING_COLUMNS", "municipality,day"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.input_dir, PathBuf::from("/mnt/forecasts"));
        assert_eq!(config.output_dir, PathBuf::from("/mnt/excel"));
        assert_eq!(config.leading_columns, vec![Column::Municipality, Column::Day]);
        assert!(config.log_json);
    }

    #[test]
    fn test_invalid_delay_is_config_error() {
        let err = config(&[("STARTUP_DELAY_MS", "soon")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_unknown_leading_column_is_config_error() {
        let err = config(&[("LEADING_COLUMNS", "province,region")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
