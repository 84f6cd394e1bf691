//! Response construction.
//!
//! # Responsibilities
//! - Emit relayed bodies with `Content-Type: text/xml` and no upstream headers
//! - Map relay errors to HTTP status codes
//!
//! # Design Decisions
//! - Missing target → 400, disallowed host → 403
//! - Upstream timeouts → 504 Gateway Timeout, other upstream errors → 502

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::relay::{Rejection, RelayError, RelayResponse, UpstreamError};

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let content_type = self.content_type();
        (self.status, [(header::CONTENT_TYPE, content_type)], self.body).into_response()
    }
}

pub fn status_for(err: &RelayError) -> StatusCode {
    match err {
        RelayError::Rejected(Rejection::MissingTarget) => StatusCode::BAD_REQUEST,
        RelayError::Rejected(Rejection::HostNotAllowed { .. }) => StatusCode::FORBIDDEN,
        RelayError::Upstream(UpstreamError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (status_for(&self), self.to_string()).into_response()
    }
}
