use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::record::{ApplicantRecord, RecordError};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

/// Main configuration.
///
/// Example YAML:
/// ```yaml
/// backend_url: "http://127.0.0.1:5000"
/// timeout: "30s"
/// theme: auto
/// log_level: warn
/// defaults:
///   AMT_INCOME_TOTAL: 72000
///   OCCUPATION_TYPE: 4
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL of the credit-risk backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Per-request timeout in humantime format ("30s", "2m"). Unset waits forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// TUI palette
    #[serde(default)]
    pub theme: ThemeMode,

    /// tracing filter directive used when RUST_LOG is unset (default: "warn")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Overrides for the built-in applicant field defaults
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, DefaultValue>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            timeout: None,
            theme: ThemeMode::default(),
            log_level: None,
            defaults: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn timeout_duration(&self) -> Result<Option<Duration>> {
        self.timeout
            .as_deref()
            .map(|t| {
                humantime::parse_duration(t)
                    .with_context(|| format!("Invalid timeout '{}'", t))
            })
            .transpose()
    }

    /// The applicant record a new form starts from
    pub fn applicant_defaults(&self) -> Result<ApplicantRecord, RecordError> {
        let overrides: BTreeMap<String, String> = self
            .defaults
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();
        ApplicantRecord::with_overrides(&overrides)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("warn")
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Detect from the terminal background
    #[default]
    Auto,
    Dark,
    Light,
}

/// A default as written in YAML; quoting is optional.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum DefaultValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Integer(n) => write!(f, "{}", n),
            DefaultValue::Float(n) => write!(f, "{}", n),
            DefaultValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert!(config.timeout_duration().unwrap().is_none());
        assert_eq!(config.theme, ThemeMode::Auto);
        assert_eq!(config.log_level(), "warn");
    }

    #[test]
    fn test_empty_config_parse() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
backend_url: "http://risk.internal:8080/api"
timeout: "30s"
theme: light
log_level: debug
defaults:
  AMT_INCOME_TOTAL: 72000
  OCCUPATION_TYPE: "Laborers"
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.backend_url, "http://risk.internal:8080/api");
        assert_eq!(config.timeout_duration().unwrap(), Some(Duration::from_secs(30)));
        assert_eq!(config.theme, ThemeMode::Light);
        assert_eq!(config.log_level(), "debug");

        let record = config.applicant_defaults().unwrap();
        assert_eq!(record.get("AMT_INCOME_TOTAL"), Some(&FieldValue::from(72000)));
        assert_eq!(
            record.get("OCCUPATION_TYPE"),
            Some(&FieldValue::Text("Laborers".to_string()))
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<Config, _> = serde_saphyr::from_str("backend: x\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let mut config = Config::default();
        config.timeout = Some("10s".to_string());
        config.theme = ThemeMode::Dark;
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}
