pub mod init;
mod schema;
mod validation;

pub use schema::{Config, DefaultValue, ThemeMode, DEFAULT_BACKEND_URL};
pub use validation::validate_config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding `backend_url` from the config file
pub const ENV_BACKEND_URL_VAR: &str = "RISK_LENS_BACKEND_URL";

/// Get the config directory path (~/.config/risk-lens/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("risk-lens"))
}

/// Get the default config file path (~/.config/risk-lens/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Check for a backend URL in the RISK_LENS_BACKEND_URL environment variable.
/// Returns Some(url) if the env var is set and non-empty, None otherwise.
pub fn get_backend_url_from_env() -> Option<String> {
    std::env::var(ENV_BACKEND_URL_VAR)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/risk-lens/config.yaml), and a missing default file means
///   built-in defaults.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            read_config(&path)?
        }
        None => {
            let default_path = get_config_path()?;
            if default_path.exists() {
                read_config(&default_path)?
            } else {
                debug!(path = %default_path.display(), "no config file, using defaults");
                Config::default()
            }
        }
    };

    if let Some(url) = get_backend_url_from_env() {
        debug!(%url, "backend URL overridden from environment");
        config.backend_url = url;
    }

    Ok(config)
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let path = env::temp_dir().join("risk_lens_test_missing_config.yaml");
        let _ = fs::remove_file(&path);
        assert!(load_config(Some(path)).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let path = env::temp_dir().join("risk_lens_test_config.yaml");
        fs::write(&path, "backend_url: \"http://10.0.0.5:5000\"\ntimeout: \"5s\"\n").unwrap();

        let config = load_config(Some(path.clone())).unwrap();
        if get_backend_url_from_env().is_none() {
            assert_eq!(config.backend_url, "http://10.0.0.5:5000");
        }
        assert_eq!(config.timeout.as_deref(), Some("5s"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_invalid_yaml() {
        let path = env::temp_dir().join("risk_lens_test_bad_config.yaml");
        fs::write(&path, "backend_url: [unclosed\n").unwrap();
        assert!(load_config(Some(path.clone())).is_err());
        let _ = fs::remove_file(&path);
    }
}
