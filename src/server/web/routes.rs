use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use super::{
    access::require_local_caller,
    info::server_info,
    sessions::{get_session_messages, list_sessions},
    stream::stream_sessions,
    types::AppState,
};
use crate::service::TranscriptService;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/:id/messages", get(get_session_messages))
        .route("/api/stream", get(stream_sessions))
        .route("/api/info", get(server_info))
        .layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        // Outermost layer: the allow-list check runs before anything else,
        // CORS preflights included.
        .layer(axum::middleware::from_fn(require_local_caller))
        .with_state(state)
}

/// Bind and serve. A bind failure (port already in use, say) propagates to
/// the caller as an ordinary error to record; it must never take the process
/// down.
pub async fn start_web_server(port: u16, service: Arc<TranscriptService>) -> Result<()> {
    let state = AppState { service, port };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("traceboard API listening on http://0.0.0.0:{}", port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
