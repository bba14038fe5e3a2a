use reqwest::Url;
use tracing_subscriber::EnvFilter;

use super::schema::Config;
use crate::record::field_index;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Validate backend_url
    match Url::parse(&config.backend_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(format!(
            "backend_url: unsupported scheme '{}' (expected http or https)",
            url.scheme()
        )),
        Err(e) => errors.push(format!(
            "backend_url: invalid URL '{}' - {}",
            config.backend_url, e
        )),
    }

    // Validate timeout syntax
    if let Some(ref timeout) = config.timeout {
        match humantime::parse_duration(timeout) {
            Ok(d) if d.is_zero() => errors.push("timeout: must be greater than zero".to_string()),
            Ok(_) => {}
            Err(e) => errors.push(format!("timeout: invalid format '{}' - {}", timeout, e)),
        }
    }

    // Validate log filter
    if let Some(ref level) = config.log_level {
        if let Err(e) = EnvFilter::try_new(level) {
            errors.push(format!("log_level: invalid filter '{}' - {}", level, e));
        }
    }

    // Validate default overrides
    for name in config.defaults.keys() {
        if field_index(name).is_none() {
            errors.push(format!("defaults.{}: unknown applicant field", name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefaultValue;

    #[test]
    fn test_valid_config() {
        let mut config = Config::default();
        config.timeout = Some("15s".to_string());
        config.defaults.insert("age".to_string(), DefaultValue::Integer(40));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_backend_url() {
        let config = Config {
            backend_url: "not a url".to_string(),
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("backend_url"));
    }

    #[test]
    fn test_unsupported_scheme() {
        let config = Config {
            backend_url: "ftp://example.com".to_string(),
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn test_invalid_timeout() {
        let config = Config {
            timeout: Some("soon".to_string()),
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("timeout"));

        let config = Config {
            timeout: Some("0s".to_string()),
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("greater than zero"));
    }

    #[test]
    fn test_unknown_default_field() {
        let mut config = Config::default();
        config.defaults.insert("salary".to_string(), DefaultValue::Integer(1));
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec!["defaults.salary: unknown applicant field".to_string()]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = Config {
            backend_url: "nope".to_string(),        // Error 1
            timeout: Some("bad".to_string()),       // Error 2
            ..Config::default()
        };
        config.defaults.insert("x".to_string(), DefaultValue::Integer(1)); // Error 3
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
