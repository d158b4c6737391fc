use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::model::{Message, Role};

/// Everything extracted from one transcript file in a single pass.
#[derive(Debug)]
pub struct TranscriptFile {
    /// Text of the first "summary" record.
    pub display_name: String,
    /// Maximum parseable record timestamp.
    pub timestamp: DateTime<Utc>,
    /// Messages in file order, only those with extractable content.
    pub messages: Vec<Message>,
    /// First non-empty per-record working directory, if any record carried one.
    pub cwd: Option<String>,
    /// Count of user-role records, with or without extractable content.
    pub user_message_count: usize,
}

/// Parse one line-delimited-JSON transcript.
///
/// Returns `None` unless the file satisfies two independent conditions:
/// it contains a "summary"-typed record (first occurrence wins) AND at least
/// one record with a parseable timestamp. A transcript missing either one
/// contributes no session at all -- the most common cause of "my session is
/// missing" reports is a file that fails exactly one of the two.
///
/// Individual lines that fail to parse as JSON are skipped; they never fail
/// the whole file.
pub fn parse_transcript(content: &str) -> Option<TranscriptFile> {
    let mut display_name: Option<String> = None;
    let mut max_timestamp: Option<DateTime<Utc>> = None;
    let mut messages = Vec::new();
    let mut cwd: Option<String> = None;
    let mut user_message_count = 0usize;

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let record: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(_) => continue,
        };

        let record_type = record.get("type").and_then(Value::as_str);

        if record_type == Some("summary") && display_name.is_none() {
            if let Some(text) = record.get("summary").and_then(Value::as_str) {
                if !text.is_empty() {
                    display_name = Some(text.to_string());
                }
            }
        }

        let timestamp = record
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(parse_timestamp);
        if let Some(ts) = timestamp {
            max_timestamp = Some(max_timestamp.map_or(ts, |prev| prev.max(ts)));
        }

        if cwd.is_none() {
            if let Some(dir) = record.get("cwd").and_then(Value::as_str) {
                if !dir.is_empty() {
                    cwd = Some(dir.to_string());
                }
            }
        }

        let role = match record_type {
            Some("user") => Some(Role::User),
            Some("assistant") => Some(Role::Assistant),
            _ => None,
        };
        if let Some(role) = role {
            if role == Role::User {
                user_message_count += 1;
            }
            if let Some(content) = extract_content(&record) {
                messages.push(Message {
                    role,
                    content,
                    timestamp,
                });
            }
        }
    }

    Some(TranscriptFile {
        display_name: display_name?,
        timestamp: max_timestamp?,
        messages,
        cwd,
        user_message_count,
    })
}

/// Transcript timestamps use a fixed millisecond-UTC format
/// (`2024-01-15T10:30:00.123Z`). Generic RFC 3339 parsing is deliberately not
/// used: the fractional part is mandatory here, and accepting looser shapes
/// would make the max-timestamp derivation drift across producers.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.3fZ")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Extract message text, tolerating the historical shapes of the content
/// field. Attempted in fixed priority order, first match wins:
///
/// 1. `message.content` as a flat string
/// 2. `message.content` as an array of typed blocks (`text` blocks verbatim,
///    `thinking` blocks rendered with a bracketed label)
/// 3. a top-level `content` or `text` string (oldest transcripts)
///
/// No matching shape means the record contributes no content. That is not an
/// error; the record still counts toward timestamps and user-message counts.
fn extract_content(record: &Value) -> Option<String> {
    let message = record.get("message");

    if let Some(text) = message
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
    {
        return Some(text.to_string());
    }

    if let Some(blocks) = message
        .and_then(|m| m.get("content"))
        .and_then(Value::as_array)
    {
        let mut parts = Vec::new();
        for block in blocks {
            match block.get("type").and_then(Value::as_str) {
                Some("text") => {
                    if let Some(text) = block.get("text").and_then(Value::as_str) {
                        parts.push(text.to_string());
                    }
                }
                Some("thinking") => {
                    if let Some(text) = block.get("thinking").and_then(Value::as_str) {
                        parts.push(format!("[Thinking] {}", text));
                    }
                }
                _ => {}
            }
        }
        if !parts.is_empty() {
            return Some(parts.join("\n"));
        }
    }

    for key in ["content", "text"] {
        if let Some(text) = record.get(key).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }

    None
}
