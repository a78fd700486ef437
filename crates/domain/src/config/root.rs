use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::fallback::FallbackConfig;
use super::http::HttpConfig;
use super::logging::LoggingConfig;
use super::provider::ProviderConfig;

/// Main configuration for beacon-dns.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// UDP bind address for the DNS server.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Discovery sources, keyed by provider id.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,

    #[serde(default)]
    pub fallback: FallbackConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            providers: BTreeMap::new(),
            fallback: FallbackConfig::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults.
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. beacon-dns.toml in current directory
    /// 3. /etc/beacon-dns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("beacon-dns.toml").exists() {
            Self::from_file("beacon-dns.toml")?
        } else if std::path::Path::new("/etc/beacon-dns/config.toml").exists() {
            Self::from_file("/etc/beacon-dns/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(listen) = overrides.listen_addr {
            self.listen_addr = listen;
        }
        if let Some(listen) = overrides.http_listen {
            self.http.listen = listen;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_addr.is_empty() {
            return Err(ConfigError::Validation(
                "listen_addr cannot be empty".to_string(),
            ));
        }

        for (id, provider) in &self.providers {
            if provider.kind.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "provider '{id}' has no type"
                )));
            }
        }

        if self.fallback.enable && self.fallback.nameservers.is_empty() {
            return Err(ConfigError::Validation(
                "fallback is enabled but no nameservers are configured".to_string(),
            ));
        }

        if self.fallback.timeout == 0 {
            return Err(ConfigError::Validation(
                "fallback timeout must be at least one second".to_string(),
            ));
        }

        if self.http.enable && self.http.listen.is_empty() {
            return Err(ConfigError::Validation(
                "http is enabled but no listen address is configured".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:53".to_string()
}

/// Command-line overrides applied on top of the loaded file.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub listen_addr: Option<String>,
    pub http_listen: Option<String>,
    pub log_level: Option<String>,
}
