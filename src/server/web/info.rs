use axum::{extract::State, Json};

use super::types::{AppState, ServerInfo};

/// `GET /api/info` -- liveness and identification.
pub async fn server_info(State(state): State<AppState>) -> Json<ServerInfo> {
    Json(ServerInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        hostname: std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string()),
        port: state.port,
    })
}
