//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, InboundRequest extraction)
//!     → relay core (validate, execute)
//!     → response.rs (text/xml body or mapped error status)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RelayRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer, FEATURE_INFO_PATH, RELAY_PATH};
