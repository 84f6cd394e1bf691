use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::{FailureMode, HostExtraction};
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub failure_mode: FailureMode,
    pub allowed_hosts: usize,
}

#[derive(Debug, Serialize)]
pub struct AllowListView {
    pub host_extraction: HostExtraction,
    pub hosts: Vec<String>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        failure_mode: state.relay.executor().failure_mode(),
        allowed_hosts: state.relay.validator().allow_list().len(),
    })
}

pub async fn get_allow_list(State(state): State<AppState>) -> Json<AllowListView> {
    let hosts = state
        .relay
        .validator()
        .allow_list()
        .hosts()
        .into_iter()
        .map(str::to_string)
        .collect();

    Json(AllowListView {
        host_extraction: state.config.allow_list.host_extraction,
        hosts,
    })
}
