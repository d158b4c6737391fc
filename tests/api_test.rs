use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use tower::ServiceExt;

use traceboard::server::{build_router, AppState};
use traceboard::{Config, Session, TranscriptService};

fn write_transcript(project_dir: &Path, name: &str, summary: &str, cwd: &str, ts: &str) {
    let mut file = std::fs::File::create(project_dir.join(name)).unwrap();
    writeln!(file, r#"{{"type":"summary","summary":"{}"}}"#, summary).unwrap();
    writeln!(
        file,
        r#"{{"type":"user","cwd":"{}","timestamp":"{}","message":{{"role":"user","content":"hello there"}}}}"#,
        cwd, ts
    )
    .unwrap();
}

async fn fixture_state() -> (AppState, tempfile::TempDir) {
    let root = tempfile::tempdir().unwrap();
    let project = root.path().join("proj");
    std::fs::create_dir(&project).unwrap();
    // Epoch seconds: 2024-01-15T10:30:00Z = 1705314600, 2024-03-01T00:00:00Z = 1709251200.
    write_transcript(
        &project,
        "jan.jsonl",
        "January session",
        "/home/alice/alpha",
        "2024-01-15T10:30:00.000Z",
    );
    write_transcript(
        &project,
        "mar.jsonl",
        "March session",
        "/home/alice/beta",
        "2024-03-01T00:00:00.000Z",
    );

    let mut config = Config::default();
    config.scan.periodic_refresh_secs = 3600;
    let service = TranscriptService::start(root.path().to_path_buf(), &config);
    service.refresh().await;

    (
        AppState {
            service,
            port: 8373,
        },
        root,
    )
}

fn request_from(addr: &str, uri: &str) -> Request<Body> {
    let mut request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let addr: SocketAddr = addr.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn public_addresses_are_forbidden() {
    let (state, _root) = fixture_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(request_from("8.8.8.8:44000", "/api/sessions"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn local_addresses_are_served() {
    let (state, _root) = fixture_state().await;
    let router = build_router(state);

    for addr in ["127.0.0.1:50000", "192.168.1.5:50000"] {
        let response = router
            .clone()
            .oneshot(request_from(addr, "/api/sessions"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let sessions: Vec<Session> = body_json(response).await;
        assert_eq!(sessions.len(), 2);
        // Newest first.
        assert_eq!(sessions[0].display_name, "March session");
    }
}

#[tokio::test]
async fn free_text_query_filters_sessions() {
    let (state, _root) = fixture_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(request_from("127.0.0.1:50000", "/api/sessions?q=january"))
        .await
        .unwrap();
    let sessions: Vec<Session> = body_json(response).await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].display_name, "January session");
}

#[tokio::test]
async fn project_substring_filters_sessions() {
    let (state, _root) = fixture_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(request_from("127.0.0.1:50000", "/api/sessions?project=beta"))
        .await
        .unwrap();
    let sessions: Vec<Session> = body_json(response).await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].project_path, "/home/alice/beta");
}

#[tokio::test]
async fn timestamp_range_is_inclusive() {
    let (state, _root) = fixture_state().await;
    let router = build_router(state);

    // since exactly on the January session's timestamp keeps it.
    let response = router
        .clone()
        .oneshot(request_from(
            "127.0.0.1:50000",
            "/api/sessions?since=1705314600",
        ))
        .await
        .unwrap();
    let sessions: Vec<Session> = body_json(response).await;
    assert_eq!(sessions.len(), 2);

    // until just before March excludes it.
    let response = router
        .oneshot(request_from(
            "127.0.0.1:50000",
            "/api/sessions?until=1709251199.5",
        ))
        .await
        .unwrap();
    let sessions: Vec<Session> = body_json(response).await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].display_name, "January session");
}

#[tokio::test]
async fn unknown_session_messages_are_empty_not_404() {
    let (state, _root) = fixture_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(request_from(
            "127.0.0.1:50000",
            "/api/sessions/does-not-exist/messages",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let messages: Vec<serde_json::Value> = body_json(response).await;
    assert!(messages.is_empty());
}

#[tokio::test]
async fn known_session_messages_are_returned() {
    let (state, _root) = fixture_state().await;
    let service = state.service.clone();
    let router = build_router(state);

    let id = service.get_all_sessions().await[1].id.clone();
    let response = router
        .oneshot(request_from(
            "127.0.0.1:50000",
            &format!("/api/sessions/{}/messages", id),
        ))
        .await
        .unwrap();
    let messages: Vec<serde_json::Value> = body_json(response).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "hello there");
    assert_eq!(messages[0]["role"], "user");
}

#[tokio::test]
async fn info_reports_version_and_port() {
    let (state, _root) = fixture_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(request_from("127.0.0.1:50000", "/api/info"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let info: serde_json::Value = body_json(response).await;
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(info["port"], 8373);
}

#[tokio::test]
async fn stream_starts_with_keepalive_comment() {
    let (state, _root) = fixture_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(request_from("127.0.0.1:50000", "/api/stream"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(content_type.starts_with("text/event-stream"));
}
