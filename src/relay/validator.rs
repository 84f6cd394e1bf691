//! Inbound request validation.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → read target (`u` parameter)
//!     → HostExtractor (host token)
//!     → AllowList membership
//!     → ValidatedTarget | Rejection
//! ```
//!
//! Validation is pure: no I/O happens here, and a rejection means the
//! executor is never reached.

use axum::http::Method;
use thiserror::Error;

use crate::relay::host::{AllowList, HostExtractor};
use crate::relay::params::ParamList;

/// Query parameter carrying the target URL for the base relay.
pub const TARGET_PARAM: &str = "u";

/// Methods the relay accepts and forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMethod {
    Get,
    Post,
}

impl RelayMethod {
    pub fn from_http(method: &Method) -> Option<Self> {
        if method == Method::GET {
            Some(Self::Get)
        } else if method == Method::POST {
            Some(Self::Post)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for RelayMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    pub method: RelayMethod,
    pub query: ParamList,
    /// Form body parameters; always empty for GET.
    pub body: ParamList,
}

impl InboundRequest {
    pub fn get(query: ParamList) -> Self {
        Self {
            method: RelayMethod::Get,
            query,
            body: ParamList::new(),
        }
    }

    pub fn post(query: ParamList, body: ParamList) -> Self {
        Self {
            method: RelayMethod::Post,
            query,
            body,
        }
    }
}

/// A target known to point at an allowed host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTarget {
    pub url: String,
    pub method: RelayMethod,
    /// Query parameters (minus the target) for GET, body parameters for POST.
    pub params: ParamList,
}

/// Why a request was refused before any outbound call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("Missing target URL")]
    MissingTarget,

    #[error("This proxy does not allow you to access that location ({url}).")]
    HostNotAllowed { url: String },
}

impl Rejection {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::MissingTarget => "missing_target",
            Rejection::HostNotAllowed { .. } => "host_not_allowed",
        }
    }
}

/// Decides whether a request may be relayed.
#[derive(Debug)]
pub struct Validator {
    allow_list: AllowList,
    extractor: Box<dyn HostExtractor>,
}

impl Validator {
    pub fn new(allow_list: AllowList, extractor: Box<dyn HostExtractor>) -> Self {
        Self {
            allow_list,
            extractor,
        }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Validate a base relay request, reading the target from `u`.
    pub fn validate(&self, request: &InboundRequest) -> Result<ValidatedTarget, Rejection> {
        let url = request
            .query
            .get(TARGET_PARAM)
            .filter(|u| !u.is_empty())
            .ok_or(Rejection::MissingTarget)?;

        let params = match request.method {
            RelayMethod::Get => request.query.without(TARGET_PARAM),
            RelayMethod::Post => request.body.clone(),
        };

        self.validate_url(url, request.method, params)
    }

    /// Check an already-assembled target URL against the allow-list.
    pub fn validate_url(
        &self,
        url: &str,
        method: RelayMethod,
        params: ParamList,
    ) -> Result<ValidatedTarget, Rejection> {
        if url.is_empty() {
            return Err(Rejection::MissingTarget);
        }

        let allowed = self
            .extractor
            .extract(url)
            .is_some_and(|host| self.allow_list.contains(&host));

        if !allowed {
            return Err(Rejection::HostNotAllowed {
                url: url.to_string(),
            });
        }

        Ok(ValidatedTarget {
            url: url.to_string(),
            method,
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::host::{ParsedHostExtractor, SegmentHostExtractor};

    fn validator() -> Validator {
        Validator::new(
            AllowList::new(["202.36.29.39"]),
            Box::new(SegmentHostExtractor),
        )
    }

    #[test]
    fn test_missing_target() {
        let req = InboundRequest::get(ParamList::parse(b"x=1"));
        assert_eq!(validator().validate(&req), Err(Rejection::MissingTarget));

        let req = InboundRequest::get(ParamList::parse(b"u="));
        assert_eq!(validator().validate(&req), Err(Rejection::MissingTarget));
    }

    #[test]
    fn test_host_not_allowed_names_url() {
        let req = InboundRequest::get(ParamList::parse(b"u=http://evil.example/steal"));
        let err = validator().validate(&req).unwrap_err();
        assert_eq!(
            err,
            Rejection::HostNotAllowed {
                url: "http://evil.example/steal".into()
            }
        );
        assert!(err.to_string().contains("http://evil.example/steal"));
        assert_eq!(err.reason(), "host_not_allowed");
    }

    #[test]
    fn test_port_is_part_of_host_token() {
        let req = InboundRequest::get(ParamList::parse(b"u=http://202.36.29.39:8080/wms"));
        assert!(matches!(
            validator().validate(&req),
            Err(Rejection::HostNotAllowed { .. })
        ));
    }

    #[test]
    fn test_get_accepted() {
        let req = InboundRequest::get(ParamList::parse(
            b"u=http%3A%2F%2F202.36.29.39%2Fwms%3FSERVICE%3DWMS&extra=1",
        ));
        let target = validator().validate(&req).unwrap();
        assert_eq!(target.url, "http://202.36.29.39/wms?SERVICE=WMS");
        assert_eq!(target.method, RelayMethod::Get);
        assert_eq!(target.params.to_pair_string(), "extra=1");
    }

    #[test]
    fn test_post_carries_body_params() {
        let req = InboundRequest::post(
            ParamList::parse(b"u=http://202.36.29.39/wfs"),
            ParamList::parse(b"a=1&b=2"),
        );
        let target = validator().validate(&req).unwrap();
        assert_eq!(target.method, RelayMethod::Post);
        assert_eq!(target.params.to_pair_string(), "a=1&b=2");
    }

    #[test]
    fn test_extractor_is_pluggable() {
        let strict = Validator::new(
            AllowList::new(["202.36.29.39"]),
            Box::new(ParsedHostExtractor),
        );
        // The legacy splitter reads "user@202.36.29.39"; strict parsing drops userinfo.
        let req = InboundRequest::get(ParamList::parse(b"u=http://user@202.36.29.39/wms"));
        assert!(strict.validate(&req).is_ok());
        assert!(validator().validate(&req).is_err());
    }
}
