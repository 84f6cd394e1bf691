//! Inbound request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every request
//! - Convert axum request parts into an `InboundRequest`
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - POST bodies are read as form parameters only when they are form-encoded;
//!   any other body yields no body parameters

use axum::http::{header, HeaderMap, HeaderValue, Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::relay::{InboundRequest, ParamList, RelayMethod};

pub const X_REQUEST_ID: &str = "x-request-id";

const FORM_MIME: &str = "application/x-www-form-urlencoded";

/// Generates `x-request-id` values as UUID v4 strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelayRequestId;

impl MakeRequestId for RelayRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID set by the request-id layer.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

fn is_form_body(headers: &HeaderMap) -> bool {
    match headers.get(header::CONTENT_TYPE) {
        None => true,
        Some(value) => value
            .to_str()
            .map(|ct| {
                ct.split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .eq_ignore_ascii_case(FORM_MIME)
            })
            .unwrap_or(false),
    }
}

/// Build an `InboundRequest`, or `None` for methods the relay does not accept.
pub fn inbound_from_parts(
    method: &Method,
    query: Option<&str>,
    headers: &HeaderMap,
    body: &[u8],
) -> Option<InboundRequest> {
    let query = ParamList::parse(query.unwrap_or_default().as_bytes());
    match RelayMethod::from_http(method)? {
        RelayMethod::Get => Some(InboundRequest::get(query)),
        RelayMethod::Post => {
            let body = if is_form_body(headers) {
                ParamList::parse(body)
            } else {
                tracing::debug!("Ignoring non-form POST body");
                ParamList::new()
            };
            Some(InboundRequest::post(query, body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(content_type: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        headers
    }

    #[test]
    fn test_get_ignores_body() {
        let req = inbound_from_parts(&Method::GET, Some("u=http://h/x"), &headers(None), b"a=1").unwrap();
        assert_eq!(req.method, RelayMethod::Get);
        assert_eq!(req.query.get("u"), Some("http://h/x"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn test_post_form_body() {
        let req = inbound_from_parts(
            &Method::POST,
            Some("u=http://h/x"),
            &headers(Some("application/x-www-form-urlencoded; charset=UTF-8")),
            b"a=1&b=2",
        )
        .unwrap();
        assert_eq!(req.body.to_pair_string(), "a=1&b=2");
    }

    #[test]
    fn test_post_non_form_body_dropped() {
        let req = inbound_from_parts(
            &Method::POST,
            None,
            &headers(Some("text/xml")),
            b"<GetFeature/>",
        )
        .unwrap();
        assert!(req.body.is_empty());
        assert!(req.query.is_empty());
    }

    #[test]
    fn test_other_methods_refused() {
        assert!(inbound_from_parts(&Method::PUT, None, &headers(None), b"").is_none());
    }

    #[test]
    fn test_request_id_generation() {
        let req = Request::builder().body(()).unwrap();
        let id = RelayRequestId.make_request_id(&req).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }
}
