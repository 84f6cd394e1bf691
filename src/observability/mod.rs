//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay handlers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID (`x-request-id`) is attached to every relay log line
//! - Metrics are recorded unconditionally; without an installed recorder they are no-ops

pub mod logging;
pub mod metrics;
