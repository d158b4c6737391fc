use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::gitmeta::SystemGit;
use crate::scanner;
use crate::server::start_web_server;
use crate::service::TranscriptService;
use crate::Result;

/// `traceboard serve`: wire up the whole pipeline and serve the local API.
pub async fn serve(config: Config, root: Option<PathBuf>, port: Option<u16>) -> Result<()> {
    let root = root.unwrap_or_else(|| config.transcript_root());
    let port = port.unwrap_or(config.server.port);
    tracing::info!("Transcript root: {:?}", root);

    let service = TranscriptService::start(root, &config);

    // Populate the first snapshot before accepting readers; a missing root
    // still swaps in an empty snapshot and records a status.
    service.refresh().await;
    let status = service.status().await;
    if let Some(error) = &status.last_error {
        tracing::warn!("Initial scan: {}", error);
    }

    if let Err(e) = start_web_server(port, service).await {
        // Bind failures (port in use, say) stop the server, not the process.
        tracing::error!("Web server stopped: {}", e);
    }
    Ok(())
}

/// `traceboard list`: one-shot scan, print and exit.
pub async fn list_sessions(config: Config, root: Option<PathBuf>, json: bool) -> Result<()> {
    let root = root.unwrap_or_else(|| config.transcript_root());
    let probe = SystemGit::new(Duration::from_secs(config.scan.git_timeout_secs));

    let parsed = match scanner::scan_root(&root, &probe).await {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Scan of {:?} failed: {}", root, e);
            Vec::new()
        }
    };

    if json {
        let sessions: Vec<_> = parsed.iter().map(|p| &p.session).collect();
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if parsed.is_empty() {
        println!("No sessions found under {:?}", root);
        return Ok(());
    }
    for item in &parsed {
        let session = &item.session;
        println!(
            "{}  {}  [{} msgs]  {}{}",
            session.timestamp.format("%Y-%m-%d %H:%M"),
            session.display_name,
            session.message_count,
            session.project_path,
            session
                .git_branch
                .as_ref()
                .map(|b| format!("  ({})", b))
                .unwrap_or_default(),
        );
    }
    Ok(())
}
