//! Configuration loading and parsing

use acc_trace_validator::ValidatorConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub checks: ValidatorConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// ASC trace to validate
    pub log: Option<PathBuf>,
    /// DBC signal database
    pub dbc: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where to write the JSON summary, if anywhere
    pub json: Option<PathBuf>,
    /// Minimum pass rate (percent) for a zero exit status
    pub min_pass_rate: f64,
    /// Print every violation under its check
    pub details: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: None,
            min_pass_rate: 80.0,
            details: false,
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate(&config).with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

/// Reject settings the checks cannot work with
pub fn validate(config: &AppConfig) -> Result<()> {
    let checks = &config.checks;
    if !(checks.timeout_seconds > 0.0) {
        bail!("checks.timeout_seconds must be positive");
    }
    if !(checks.correlation_window >= 0.0) {
        bail!("checks.correlation_window must not be negative");
    }
    if !(0.0..=100.0).contains(&config.output.min_pass_rate) {
        bail!("output.min_pass_rate must be between 0 and 100");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            log = "sample_can_log.asc"
            dbc = "acc_signals.dbc"

            [checks]
            overspeed_threshold = 120.0
            timeout_message = "VehicleSpeed"

            [output]
            json = "test_results.json"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.log, Some(PathBuf::from("sample_can_log.asc")));
        assert_eq!(config.checks.overspeed_threshold, 120.0);
        assert_eq!(config.checks.timeout_message.as_deref(), Some("VehicleSpeed"));
        assert_eq!(config.checks.brake_threshold, 200.0);
        assert_eq!(config.output.min_pass_rate, 80.0);
        assert!(!config.output.details);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.input.log.is_none());
        assert_eq!(config.checks.timeout_seconds, 2.0);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_load_config_rejects_bad_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nmin_pass_rate = 150.0").unwrap();
        file.flush().unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("min_pass_rate"));
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config(Path::new("/nonexistent/acc.toml")).is_err());
    }
}
