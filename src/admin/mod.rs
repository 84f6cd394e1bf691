//! Admin endpoints.
//!
//! Mounted on the relay listener only when `admin.enabled` is set, and
//! guarded by a bearer token.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/allow-list", get(get_allow_list))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
