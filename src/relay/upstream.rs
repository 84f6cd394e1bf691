//! Outbound HTTP calls.
//!
//! # Responsibilities
//! - Issue GET or form-encoded POST requests to validated targets
//! - Enforce connect and total timeouts
//! - Capture the response body up to a size limit; discard headers
//!
//! # Design Decisions
//! - `Upstream` is a trait so the executor can be exercised without a network
//! - Redirects are not followed
//! - Dropping the returned future aborts the outbound request

use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::relay::validator::{RelayMethod, ValidatedTarget};

/// Content type of relayed POST bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A fully built outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: RelayMethod,
    pub url: String,
    /// `key=value&...` body, present for POST only.
    pub body: Option<String>,
}

impl From<ValidatedTarget> for OutboundRequest {
    fn from(target: ValidatedTarget) -> Self {
        let body = match target.method {
            RelayMethod::Get => None,
            RelayMethod::Post => Some(target.params.to_pair_string()),
        };
        Self {
            method: target.method,
            url: target.url,
            body,
        }
    }
}

/// Status and body captured from the upstream service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Errors contacting the upstream service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Invalid upstream URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Upstream timed out after {0:?}")]
    Timeout(Duration),

    #[error("Upstream connection failed: {0}")]
    Connect(String),

    #[error("Upstream request failed: {0}")]
    Request(String),

    #[error("Upstream body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl UpstreamError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::InvalidUrl { .. } => "invalid_url",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Connect(_) => "connect",
            UpstreamError::Request(_) => "request",
            UpstreamError::BodyTooLarge { .. } => "body_too_large",
            UpstreamError::Client(_) => "client",
        }
    }
}

/// Something that can perform an outbound call.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamReply, UpstreamError>;
}

/// reqwest-backed upstream client.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpUpstream {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("ows-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            max_body_bytes: config.max_response_bytes,
        })
    }

    fn classify(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else if err.is_connect() {
            UpstreamError::Connect(err.to_string())
        } else {
            UpstreamError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamReply, UpstreamError> {
        let url = reqwest::Url::parse(&request.url).map_err(|e| UpstreamError::InvalidUrl {
            url: request.url.clone(),
            reason: e.to_string(),
        })?;

        let builder = match request.method {
            RelayMethod::Get => self.client.get(url),
            RelayMethod::Post => self
                .client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(request.body.unwrap_or_default()),
        };

        let mut response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(UpstreamError::BodyTooLarge {
                    limit: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(UpstreamReply {
            status,
            body: body.freeze(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::params::ParamList;

    #[test]
    fn test_outbound_from_get_target_has_no_body() {
        let target = ValidatedTarget {
            url: "http://202.36.29.39/wms?SERVICE=WMS".into(),
            method: RelayMethod::Get,
            params: ParamList::parse(b"ignored=1"),
        };
        let out = OutboundRequest::from(target);
        assert_eq!(out.url, "http://202.36.29.39/wms?SERVICE=WMS");
        assert_eq!(out.body, None);
    }

    #[test]
    fn test_outbound_from_post_target_joins_body() {
        let target = ValidatedTarget {
            url: "http://202.36.29.39/wfs".into(),
            method: RelayMethod::Post,
            params: [("a", "1"), ("b", "2")].into_iter().collect(),
        };
        let out = OutboundRequest::from(target);
        assert_eq!(out.body.as_deref(), Some("a=1&b=2"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(UpstreamError::Timeout(Duration::from_secs(5)).kind(), "timeout");
        assert_eq!(UpstreamError::BodyTooLarge { limit: 10 }.kind(), "body_too_large");
        assert!(UpstreamError::Connect("refused".into())
            .to_string()
            .contains("refused"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_reported() {
        let upstream = HttpUpstream::new(&UpstreamConfig::default()).unwrap();
        let err = upstream
            .send(OutboundRequest {
                method: RelayMethod::Get,
                url: "not a url".into(),
                body: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidUrl { .. }));
    }
}
