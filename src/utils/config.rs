use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::utils::errors::{AppError, ConfigError, Result};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080/www/api.cgi";
pub const DEFAULT_AUDIT_LIMIT: usize = 200;
pub const DEFAULT_AUDIT_EXPORT_LIMIT: usize = 10_000;

/// Console settings read from an optional TOML file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub endpoint: String,
    pub audit_limit: usize,
    pub audit_export_limit: usize,
    pub export_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub preferences_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            audit_limit: DEFAULT_AUDIT_LIMIT,
            audit_export_limit: DEFAULT_AUDIT_EXPORT_LIMIT,
            export_dir: PathBuf::from("."),
            log_file: None,
            request_timeout_secs: None,
            preferences_file: None,
        }
    }
}

impl Config {
    /// Load the file at `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    ConfigError::InvalidFile(format!("{}: {}", path.display(), e))
                })?;
                Self::from_toml(&raw)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| AppError::Config(ConfigError::InvalidFile(e.to_string())))
    }

    fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "endpoint".to_string(),
                value: self.endpoint.clone(),
            }
            .into());
        }
        if self.audit_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "audit_limit".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Result<Self> {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
            self.validate()?;
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }

    /// Where the language/theme preferences live.
    pub fn preferences_path(&self) -> PathBuf {
        if let Some(ref path) = self.preferences_file {
            return path.clone();
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("f2b-console")
            .join("preferences.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn partial_file_overrides_fields() {
        let config = Config::from_toml(
            "endpoint = \"https://nas.local/fail2ban/www/api.cgi\"\nrequest_timeout_secs = 15\n",
        )
        .unwrap();
        assert_eq!(config.endpoint, "https://nas.local/fail2ban/www/api.cgi");
        assert_eq!(config.audit_limit, DEFAULT_AUDIT_LIMIT);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("endpoitn = \"x\"").is_err());
    }

    #[test]
    fn endpoint_override_is_validated() {
        let err = Config::default().with_endpoint(Some("ftp://host".to_string()));
        assert!(matches!(
            err,
            Err(AppError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn zero_timeout_means_no_timeout() {
        let config = Config {
            request_timeout_secs: Some(0),
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), None);
    }
}
