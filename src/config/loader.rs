//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `allow_list.hosts` (comma-separated).
pub const ALLOWED_HOSTS_ENV: &str = "OWS_RELAY_ALLOWED_HOSTS";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration ready to run, plus what was overridden on the way.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: RelayConfig,
    /// Whether `OWS_RELAY_ALLOWED_HOSTS` replaced the configured hosts.
    pub hosts_overridden: bool,
}

/// Read `path` (or defaults), apply the environment and `bind_address`
/// overrides, then validate the result.
pub fn load(path: Option<&Path>, bind_address: Option<String>) -> Result<LoadedConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind_address) = bind_address {
        config.listener.bind_address = bind_address;
    }
    let hosts_overridden =
        apply_allowed_hosts_override(&mut config, std::env::var(ALLOWED_HOSTS_ENV).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(LoadedConfig {
        config,
        hosts_overridden,
    })
}

/// Load, apply environment overrides, and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    load(Some(path), None).map(|loaded| loaded.config)
}

fn read_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Replace the allow-list with a comma-separated override, if one is given.
/// Returns whether the hosts were replaced.
pub fn apply_allowed_hosts_override(config: &mut RelayConfig, value: Option<String>) -> bool {
    let Some(value) = value else {
        return false;
    };
    config.allow_list.hosts = value
        .split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect();
    true
}
