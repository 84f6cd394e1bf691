//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, OWS_RELAY_ALLOWED_HOSTS override)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changing the allow-list requires a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_config, ConfigError, LoadedConfig, ALLOWED_HOSTS_ENV};
pub use schema::{
    AdminConfig, AllowListConfig, FailureMode, HostExtraction, ListenerConfig, LogFormat,
    ObservabilityConfig, RelayConfig, SecurityConfig, TimeoutConfig, UpstreamConfig,
};
