//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Hosts the relay may contact.
    pub allow_list: AllowListConfig,

    /// Outbound client settings.
    pub upstream: UpstreamConfig,

    /// Inbound timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,

    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// How the host token is read from a target URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostExtraction {
    /// Third `/`-separated segment of the raw string.
    #[default]
    Segment,
    /// Host and port from a full URL parse.
    Parsed,
}

/// Allow-list configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AllowListConfig {
    /// Permitted host tokens, e.g. "202.36.29.39" or "maps.example.org:8080".
    pub hosts: Vec<String>,

    /// Host extraction strategy.
    pub host_extraction: HostExtraction,
}

/// What the client sees when the upstream call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Always 200 `text/xml`; failures relay an empty body.
    #[default]
    PassThrough,
    /// Upstream status is relayed; transport failures become 502/504.
    Strict,
}

/// Outbound client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Total outbound request timeout in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    pub failure_mode: FailureMode,

    /// Largest upstream body relayed, in bytes.
    pub max_response_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            failure_mode: FailureMode::PassThrough,
            max_response_bytes: 16 * 1024 * 1024, // 16MB
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Placeholder admin key; refused by validation when admin is enabled.
pub const PLACEHOLDER_API_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount `/admin/*` on the relay listener.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: PLACEHOLDER_API_KEY.to_string(),
        }
    }
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert!(config.allow_list.hosts.is_empty());
        assert_eq!(config.allow_list.host_extraction, HostExtraction::Segment);
        assert_eq!(config.upstream.failure_mode, FailureMode::PassThrough);
        assert_eq!(config.upstream.timeout_secs, 10);
        assert!(!config.admin.enabled);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: RelayConfig = toml::from_str(
            r#"
            [allow_list]
            hosts = ["202.36.29.39"]
            "#,
        )
        .unwrap();
        assert_eq!(config.allow_list.hosts, vec!["202.36.29.39"]);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_parse_full_toml() {
        let config: RelayConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [allow_list]
            hosts = ["a.example", "b.example:8080"]
            host_extraction = "parsed"

            [upstream]
            timeout_secs = 3
            failure_mode = "strict"

            [observability]
            log_format = "json"

            [admin]
            enabled = true
            api_key = "s3cret"
            "#,
        )
        .unwrap();
        assert_eq!(config.allow_list.host_extraction, HostExtraction::Parsed);
        assert_eq!(config.upstream.failure_mode, FailureMode::Strict);
        assert_eq!(config.upstream.timeout_secs, 3);
        assert_eq!(config.upstream.connect_timeout_secs, 5);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.admin.api_key, "s3cret");
    }
}
