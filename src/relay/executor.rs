//! Relay execution.
//!
//! # Responsibilities
//! - Turn a validated target into an outbound call
//! - Build the GetFeatureInfo URL for the feature-info variant
//! - Produce a `text/xml` response from the captured body
//!
//! # Design Decisions
//! - Pass-through mode (default) never distinguishes upstream failure from
//!   success: a failed call relays an empty body with status 200
//! - Strict mode surfaces upstream status codes and transport errors
//! - No retries; each call is attempted exactly once

use std::sync::Arc;

use axum::http::StatusCode;
use bytes::Bytes;

use crate::config::FailureMode;
use crate::relay::feature_info::{augmented_url, REQUEST_URL_PARAM};
use crate::relay::params::ParamList;
use crate::relay::upstream::{OutboundRequest, Upstream, UpstreamError};
use crate::relay::validator::{InboundRequest, Rejection, RelayMethod, ValidatedTarget, Validator};
use crate::relay::RelayError;

/// Content type declared on every relayed response.
pub const RELAY_CONTENT_TYPE: &str = "text/xml";

/// Body and status to send back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RelayResponse {
    pub fn ok(body: Bytes) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn content_type(&self) -> &'static str {
        RELAY_CONTENT_TYPE
    }
}

/// Performs outbound calls through an [`Upstream`].
pub struct Executor {
    upstream: Arc<dyn Upstream>,
    failure_mode: FailureMode,
}

impl Executor {
    pub fn new(upstream: Arc<dyn Upstream>, failure_mode: FailureMode) -> Self {
        Self {
            upstream,
            failure_mode,
        }
    }

    pub fn failure_mode(&self) -> FailureMode {
        self.failure_mode
    }

    /// Relay a validated target: GET as-is, or POST with a joined form body.
    pub async fn execute(&self, target: ValidatedTarget) -> Result<RelayResponse, RelayError> {
        let outbound = OutboundRequest::from(target);
        let url = outbound.url.clone();

        tracing::debug!(
            method = %outbound.method,
            url = %url,
            body_len = outbound.body.as_ref().map(String::len).unwrap_or(0),
            "Sending upstream request"
        );

        match self.upstream.send(outbound).await {
            Ok(reply) => {
                if !reply.status.is_success() {
                    tracing::warn!(url = %url, status = %reply.status, "Upstream returned non-success status");
                }
                let status = match self.failure_mode {
                    FailureMode::PassThrough => StatusCode::OK,
                    FailureMode::Strict => reply.status,
                };
                Ok(RelayResponse {
                    status,
                    body: reply.body,
                })
            }
            Err(e) => self.on_failure(&url, e),
        }
    }

    /// Feature-info variant: build the augmented URL from the inbound query,
    /// validate it, and always issue a GET.
    pub async fn execute_with_augmentation(
        &self,
        validator: &Validator,
        request: &InboundRequest,
    ) -> Result<RelayResponse, RelayError> {
        if request.query.get(REQUEST_URL_PARAM).map_or(true, str::is_empty) {
            return Err(Rejection::MissingTarget.into());
        }

        let url = augmented_url(&request.query);
        let target = validator.validate_url(&url, RelayMethod::Get, ParamList::new())?;
        self.execute(target).await
    }

    fn on_failure(&self, url: &str, err: UpstreamError) -> Result<RelayResponse, RelayError> {
        match self.failure_mode {
            FailureMode::PassThrough => {
                tracing::warn!(url = %url, error = %err, kind = err.kind(), "Upstream failed, relaying empty body");
                Ok(RelayResponse::ok(Bytes::new()))
            }
            FailureMode::Strict => {
                tracing::error!(url = %url, error = %err, kind = err.kind(), "Upstream failed");
                Err(err.into())
            }
        }
    }
}
