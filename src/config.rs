//! Configuration loader and validator for the mini-app client.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub api: Api,
    pub telegram: Telegram,
}

/// Backend endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Api {
    pub base_url: String,
}

/// Telegram session settings. `init_data` may be omitted here and supplied
/// through the `TELEGRAM_INIT_DATA` environment variable instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Telegram {
    #[serde(default)]
    pub init_data: Option<String>,
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.api.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("api.base_url must be non-empty"));
    }
    if !cfg.api.base_url.starts_with("http://") && !cfg.api.base_url.starts_with("https://") {
        return Err(ConfigError::Invalid("api.base_url must be an http(s) URL"));
    }
    Ok(())
}

/// Example YAML configuration.
pub fn example() -> &'static str {
    r#"api:
  base_url: "https://tenderbot.example.com"

telegram:
  # Raw initData string forwarded with every request. Leave unset to read
  # it from the TELEGRAM_INIT_DATA environment variable.
  init_data: "query_id=AAE...&user=%7B...%7D&hash=..."
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        assert!(cfg.telegram.init_data.is_some());
    }

    #[test]
    fn invalid_base_url() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.api.base_url = "".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("api.base_url")),
            _ => panic!("wrong error"),
        }

        cfg.api.base_url = "ftp://tenderbot.example.com".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn init_data_may_be_omitted() {
        let cfg: Config = serde_yaml::from_str("api:\n  base_url: \"https://x.test\"\ntelegram: {}\n").unwrap();
        validate(&cfg).unwrap();
        assert!(cfg.telegram.init_data.is_none());
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        fs::write(&p, example()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.api.base_url, "https://tenderbot.example.com");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let td = tempdir().unwrap();
        let p = td.path().join("nope.yaml");
        assert!(matches!(load(Some(&p)), Err(ConfigError::Io(_))));
    }
}
