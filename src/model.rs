use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::index::SearchIndex;

/// One conversation session, derived from a single JSONL transcript file.
///
/// `id` is a truncated hash of the transcript file's absolute path, so it is
/// stable across re-parses of the same file. A renamed or moved transcript
/// gets a new id; that is documented behavior, not a bug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    /// Human-facing log identifier (the transcript file stem), unique per project.
    pub session_id: String,
    /// Text of the first "summary" record in the transcript.
    pub display_name: String,
    /// Maximum message timestamp seen in the transcript, not file mtime.
    pub timestamp: DateTime<Utc>,
    pub project_path: String,
    /// Count of user-role records only.
    pub message_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_repo_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single conversation message, kept only for the lifetime of the snapshot
/// it was parsed into.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// The immutable (sessions, index, message details) triple produced by one
/// refresh cycle. All three are built from the same parse pass and installed
/// into the cache as one unit.
#[derive(Debug, Default)]
pub struct Snapshot {
    /// Newest-first by session timestamp.
    pub sessions: Vec<Session>,
    pub index: SearchIndex,
    pub messages: HashMap<String, Vec<Message>>,
}

impl Snapshot {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

/// A session together with its parsed messages, as produced by the scanner.
/// Messages are consumed by the index builder and the message-detail map and
/// discarded with the snapshot.
#[derive(Debug, Clone)]
pub struct ParsedSession {
    pub session: Session,
    pub messages: Vec<Message>,
}
