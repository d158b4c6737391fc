pub mod identity;
pub mod transcript;

use anyhow::Result;
use std::path::Path;
use tracing::{debug, info};

use crate::gitmeta::GitProbe;
use crate::model::{ParsedSession, Session};

/// Scan a transcript root: one subdirectory per project, one `.jsonl` file
/// per session. Hidden subdirectories are skipped. Per-file problems are
/// absorbed (a broken transcript just contributes nothing); only a missing
/// or unreadable root propagates as an error, which the pipeline turns into
/// an empty snapshot plus a status string.
pub async fn scan_root<G: GitProbe>(root: &Path, probe: &G) -> Result<Vec<ParsedSession>> {
    let mut sessions = Vec::new();
    let mut entries = tokio::fs::read_dir(root).await?;

    while let Some(entry) = entries.next_entry().await? {
        let dir_path = entry.path();
        if !dir_path.is_dir() {
            continue;
        }
        let dir_name = match dir_path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if dir_name.starts_with('.') {
            continue;
        }

        let mut files = match tokio::fs::read_dir(&dir_path).await {
            Ok(files) => files,
            Err(e) => {
                debug!("Skipping unreadable project dir {:?}: {}", dir_path, e);
                continue;
            }
        };
        while let Some(file_entry) = files.next_entry().await? {
            let file_path = file_entry.path();
            if file_path.extension().and_then(|s| s.to_str()) != Some("jsonl") {
                continue;
            }
            match parse_session_file(&file_path, dir_name, probe).await {
                Some(parsed) => sessions.push(parsed),
                None => {
                    // Missing summary or no valid timestamp. Expected for
                    // in-progress or pre-summary transcripts, so only a
                    // diagnostic, never an error.
                    debug!("No session derived from {:?}", file_path);
                }
            }
        }
    }

    // Newest first; the cache and every read surface preserve this order.
    sessions.sort_by(|a, b| b.session.timestamp.cmp(&a.session.timestamp));
    info!("Scan complete: {} sessions", sessions.len());
    Ok(sessions)
}

/// Parse one transcript file into a session, or nothing.
async fn parse_session_file<G: GitProbe>(
    file_path: &Path,
    project_dir_name: &str,
    probe: &G,
) -> Option<ParsedSession> {
    let content = match tokio::fs::read_to_string(file_path).await {
        Ok(content) => content,
        Err(e) => {
            debug!("Unreadable transcript {:?}: {}", file_path, e);
            return None;
        }
    };
    let parsed = transcript::parse_transcript(&content)?;

    // Embedded working directory wins; the directory-name decode is the
    // lossy fallback.
    let project_path = parsed
        .cwd
        .clone()
        .unwrap_or_else(|| identity::decode_project_dir(project_dir_name));

    let session_id = file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();

    let git = probe.enrich(&project_path).await;

    let session = Session {
        id: identity::session_file_id(file_path),
        session_id,
        display_name: parsed.display_name,
        timestamp: parsed.timestamp,
        project_path,
        message_count: parsed.user_message_count,
        git_branch: git.branch,
        git_repo_name: git.repo_name,
    };

    Some(ParsedSession {
        session,
        messages: parsed.messages,
    })
}
