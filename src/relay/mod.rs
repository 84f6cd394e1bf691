//! Relay core.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → validator.rs (target + allow-list)  ──reject──▶ Rejection
//!     → executor.rs (outbound call via upstream.rs)
//!     → RelayResponse (body, text/xml)
//!
//! Feature-info variant:
//!     InboundRequest
//!     → feature_info.rs (query + fixed OGC parameters)
//!     → validator.rs (same allow-list)
//!     → executor.rs (always GET)
//! ```
//!
//! # Design Decisions
//! - No state survives a request; the allow-list is read-only after startup
//! - Validation never performs I/O
//! - The outbound client sits behind the `Upstream` trait

pub mod executor;
pub mod feature_info;
pub mod host;
pub mod params;
pub mod upstream;
pub mod validator;

use std::sync::Arc;

use thiserror::Error;

use crate::config::RelayConfig;

pub use executor::{Executor, RelayResponse, RELAY_CONTENT_TYPE};
pub use host::{AllowList, HostExtractor};
pub use params::ParamList;
pub use upstream::{HttpUpstream, OutboundRequest, Upstream, UpstreamError, UpstreamReply};
pub use validator::{InboundRequest, Rejection, RelayMethod, ValidatedTarget, Validator};

/// Any reason a relay call did not produce a response body.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Validator and executor composed for both relay endpoints.
pub struct Relay {
    validator: Validator,
    executor: Executor,
}

impl Relay {
    pub fn new(validator: Validator, executor: Executor) -> Self {
        Self {
            validator,
            executor,
        }
    }

    /// Build from configuration with the given outbound client.
    pub fn from_config(config: &RelayConfig, upstream: Arc<dyn Upstream>) -> Self {
        let validator = Validator::new(
            AllowList::new(config.allow_list.hosts.iter().cloned()),
            host::extractor_for(config.allow_list.host_extraction),
        );
        let executor = Executor::new(upstream, config.upstream.failure_mode);
        Self::new(validator, executor)
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Base relay: validate the `u` target, then forward.
    pub async fn relay(&self, request: &InboundRequest) -> Result<RelayResponse, RelayError> {
        let target = self.validator.validate(request)?;
        self.executor.execute(target).await
    }

    /// GetFeatureInfo relay.
    pub async fn feature_info(&self, request: &InboundRequest) -> Result<RelayResponse, RelayError> {
        self.executor
            .execute_with_augmentation(&self.validator, request)
            .await
    }
}
