use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, validate_config, Config, DefaultValue, ThemeMode, DEFAULT_BACKEND_URL};
use crate::record::{field_spec, FieldValue};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

fn parse_theme(input: &str) -> Option<ThemeMode> {
    match input.trim().to_lowercase().as_str() {
        "auto" => Some(ThemeMode::Auto),
        "dark" => Some(ThemeMode::Dark),
        "light" => Some(ThemeMode::Light),
        _ => None,
    }
}

fn default_value_from_input(input: &str) -> DefaultValue {
    match FieldValue::coerce(input) {
        FieldValue::Numeric(n) => match n.as_i64() {
            Some(i) => DefaultValue::Integer(i),
            None => DefaultValue::Float(n.as_f64().unwrap_or_default()),
        },
        FieldValue::Text(s) => DefaultValue::Text(s),
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("risk-lens configuration");
    println!("=======================");
    println!();

    let mut config = Config::default();

    // 1. Backend
    println!("Where does the credit-risk backend listen?");
    loop {
        config.backend_url = prompt_with_default("Backend URL", DEFAULT_BACKEND_URL)?;
        match validate_config(&config) {
            Ok(()) => break,
            Err(errors) => println!("  Invalid: {}. Try again.", errors.join("; ")),
        }
    }

    // 2. Timeout
    println!();
    println!("Requests wait indefinitely unless a timeout is set (e.g. '30s', '2m').");
    loop {
        let input = prompt_with_default("Request timeout", "none")?;
        if input == "none" || input.is_empty() {
            config.timeout = None;
            break;
        }
        match humantime::parse_duration(&input) {
            Ok(d) if !d.is_zero() => {
                config.timeout = Some(input);
                break;
            }
            Ok(_) => println!("  Invalid: must be greater than zero. Try again."),
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    }

    // 3. Theme
    println!();
    config.theme = loop {
        let input = prompt_with_default("Theme (auto, dark, light)", "auto")?;
        match parse_theme(&input) {
            Some(theme) => break theme,
            None => println!("  Invalid theme '{}'. Try again.", input),
        }
    };

    // 4. Applicant defaults
    println!();
    let mut add_default = prompt_yes_no("Override applicant field defaults?", false)?;
    while add_default {
        let name = loop {
            let n = prompt("  Field name (see `risk-lens fields`): ")?;
            if field_spec(&n).is_some() {
                break n;
            }
            println!("  Unknown field '{}'.", n);
        };
        let value = prompt("  Default value: ")?;
        config.defaults.insert(name, default_value_from_input(&value));
        add_default = prompt_yes_no("  Override another field?", false)?;
    }

    // 5. Config path
    let default_config_path = match default_path {
        Some(path) => path,
        None => get_config_path()?,
    };
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    // Check if file already exists
    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 6. Write config
    write_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `risk-lens` to get started.");

    Ok(())
}

/// Serialize `config` as YAML and replace `path` atomically.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    // Create parent directories
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use std::env;

    #[test]
    fn test_parse_theme() {
        assert_eq!(parse_theme("Dark"), Some(ThemeMode::Dark));
        assert_eq!(parse_theme(" light "), Some(ThemeMode::Light));
        assert_eq!(parse_theme("auto"), Some(ThemeMode::Auto));
        assert_eq!(parse_theme("sepia"), None);
    }

    #[test]
    fn test_default_value_from_input() {
        assert_eq!(default_value_from_input("72000"), DefaultValue::Integer(72000));
        assert_eq!(default_value_from_input("2.5"), DefaultValue::Float(2.5));
        assert_eq!(
            default_value_from_input("Laborers"),
            DefaultValue::Text("Laborers".to_string())
        );
    }

    #[test]
    fn test_write_config_roundtrip() {
        let dir = env::temp_dir().join("risk_lens_test_init");
        let path = dir.join("config.yaml");
        let _ = std::fs::remove_file(&path);

        let mut config = Config::default();
        config.timeout = Some("20s".to_string());
        config.theme = ThemeMode::Light;
        config.defaults.insert("age".to_string(), DefaultValue::Integer(45));
        write_config(&path, &config).unwrap();

        let loaded = load_config(Some(path.clone())).unwrap();
        assert_eq!(loaded.timeout, config.timeout);
        assert_eq!(loaded.theme, ThemeMode::Light);
        assert_eq!(loaded.defaults, config.defaults);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
