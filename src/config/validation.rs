//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject allow-list entries that can never match a host token
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{RelayConfig, PLACEHOLDER_API_KEY};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.allow_list.hosts.is_empty() {
        errors.push(ValidationError::new(
            "allow_list.hosts",
            "at least one host is required",
        ));
    }
    for host in &config.allow_list.hosts {
        if host.is_empty() || host.contains('/') || host.chars().any(char::is_whitespace) {
            errors.push(ValidationError::new(
                "allow_list.hosts",
                format!("'{}' is not a host token", host),
            ));
        }
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.timeout_secs", "must be > 0"));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.connect_timeout_secs", "must be > 0"));
    }
    if config.upstream.max_response_bytes == 0 {
        errors.push(ValidationError::new("upstream.max_response_bytes", "must be > 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.admin.enabled
        && (config.admin.api_key.is_empty() || config.admin.api_key == PLACEHOLDER_API_KEY)
    {
        errors.push(ValidationError::new(
            "admin.api_key",
            "must be set when admin is enabled",
        ));
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

    fn valid() -> RelayConfig {
        let mut config = RelayConfig::default();
        config.allow_list.hosts = vec!["202.36.29.39".into()];
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_empty_allow_list_rejected() {
        let errors = validate_config(&RelayConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "allow_list.hosts");
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.listener.bind_address = "nope".into();
        config.allow_list.hosts.push("http://x/".into());
        config.upstream.timeout_secs = 0;
        config.admin.enabled = true;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "allow_list.hosts",
                "upstream.timeout_secs",
                "admin.api_key"
            ]
        );
        assert!(errors[1].to_string().contains("http://x/"));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = valid();
        config.observability.metrics_address = "bad".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
