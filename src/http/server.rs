//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the relay, feature-info, and admin handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Serve on a bound listener until shutdown
//!
//! When a client disconnects, axum drops the handler future, which also
//! drops the in-flight upstream call.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::RelayConfig;
use crate::http::request::{inbound_from_parts, request_id, RelayRequestId};
use crate::http::response::status_for;
use crate::observability::metrics;
use crate::relay::feature_info::LAYERS_PARAM;
use crate::relay::{HttpUpstream, Relay, RelayError, RelayResponse, Upstream, UpstreamError};

/// Base relay endpoint; target in `u`.
pub const RELAY_PATH: &str = "/proxy";

/// GetFeatureInfo endpoint.
pub const FEATURE_INFO_PATH: &str = "/feature-info";

const RELAY_ENDPOINT: &str = "relay";
const FEATURE_INFO_ENDPOINT: &str = "feature_info";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub config: Arc<RelayConfig>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: Arc<RelayConfig>,
}

impl HttpServer {
    /// Create a server with a reqwest-backed upstream client.
    pub fn new(config: RelayConfig) -> Result<Self, UpstreamError> {
        let upstream = Arc::new(HttpUpstream::new(&config.upstream)?);
        Ok(Self::with_upstream(config, upstream))
    }

    /// Create a server with the given outbound client.
    pub fn with_upstream(config: RelayConfig, upstream: Arc<dyn Upstream>) -> Self {
        let relay = Arc::new(Relay::from_config(&config, upstream));
        let config = Arc::new(config);
        let state = AppState {
            relay,
            config: config.clone(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let mut routes = Router::new()
            .route(RELAY_PATH, get(relay_handler).post(relay_handler))
            .route(
                FEATURE_INFO_PATH,
                get(feature_info_handler).post(feature_info_handler),
            );

        if config.admin.enabled {
            routes = routes.merge(setup_admin_router(state.clone()));
        }

        routes.with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(RelayRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown receiver fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            allowed_hosts = self.config.allow_list.hosts.len(),
            failure_mode = ?self.config.upstream.failure_mode,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Base relay handler: `GET|POST /proxy?u=<target>`.
async fn relay_handler(
    State(state): State<AppState>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let Some(inbound) = inbound_from_parts(&method, query.as_deref(), &headers, &body) else {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    };

    tracing::debug!(
        request_id = %request_id(&headers),
        method = %method,
        target = ?inbound.query.get("u"),
        "Relaying request"
    );

    let result = state.relay.relay(&inbound).await;
    finish(RELAY_ENDPOINT, &headers, start, result)
}

/// GetFeatureInfo handler: `GET|POST /feature-info?RequestURL=...&LAYERS=...`.
async fn feature_info_handler(
    State(state): State<AppState>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let Some(inbound) = inbound_from_parts(&method, query.as_deref(), &headers, &body) else {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    };

    tracing::debug!(
        request_id = %request_id(&headers),
        layers = ?inbound.query.get(LAYERS_PARAM),
        "Relaying GetFeatureInfo"
    );

    let result = state.relay.feature_info(&inbound).await;
    finish(FEATURE_INFO_ENDPOINT, &headers, start, result)
}

/// Log, record metrics, and convert the relay outcome into a response.
fn finish(
    endpoint: &'static str,
    headers: &HeaderMap,
    start: Instant,
    result: Result<RelayResponse, RelayError>,
) -> Response {
    let request_id = request_id(headers);
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(resp) => {
            tracing::info!(
                request_id = %request_id,
                endpoint,
                status = resp.status.as_u16(),
                bytes = resp.body.len(),
                elapsed_ms,
                "Relay complete"
            );
            metrics::record_request(endpoint, resp.status.as_u16(), start);
            resp.into_response()
        }
        Err(err) => {
            let status = status_for(&err);
            match &err {
                RelayError::Rejected(rejection) => {
                    tracing::warn!(
                        request_id = %request_id,
                        endpoint,
                        reason = rejection.reason(),
                        error = %rejection,
                        "Request rejected"
                    );
                    metrics::record_rejection(endpoint, rejection.reason());
                }
                RelayError::Upstream(upstream) => {
                    tracing::error!(
                        request_id = %request_id,
                        endpoint,
                        kind = upstream.kind(),
                        error = %upstream,
                        elapsed_ms,
                        "Upstream failure"
                    );
                    metrics::record_upstream_failure(endpoint, upstream.kind());
                }
            }
            metrics::record_request(endpoint, status.as_u16(), start);
            err.into_response()
        }
    }
}
