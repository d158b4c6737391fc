use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::types::{AppState, SessionFilter};
use crate::model::{Message, Session};

/// `GET /api/sessions` -- the current snapshot, filtered server-side.
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(filter): Query<SessionFilter>,
) -> Json<Vec<Session>> {
    let sessions = match filter.q.as_deref() {
        Some(query) if !query.is_empty() => state.service.search(query).await,
        _ => state.service.get_all_sessions().await,
    };

    let filtered = sessions
        .into_iter()
        .filter(|session| {
            if let Some(project) = &filter.project {
                if !session.project_path.contains(project.as_str()) {
                    return false;
                }
            }
            let epoch = session.timestamp.timestamp_millis() as f64 / 1000.0;
            if let Some(since) = filter.since {
                if epoch < since {
                    return false;
                }
            }
            if let Some(until) = filter.until {
                if epoch > until {
                    return false;
                }
            }
            true
        })
        .collect();

    Json(filtered)
}

/// `GET /api/sessions/{id}/messages` -- message history for one session.
/// Unknown ids yield an empty array, not a 404.
pub async fn get_session_messages(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Json<Vec<Message>> {
    Json(state.service.get_messages(&id).await)
}
