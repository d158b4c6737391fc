use sha2::{Digest, Sha256};
use std::path::Path;

/// Stable session id: first 16 hex chars of the SHA-256 of the transcript
/// file's absolute path. Hashing the path (not the content) means re-parsing
/// an unchanged or appended-to file yields the same id, while a moved file is
/// treated as a new session.
pub fn session_file_id(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    let hex = format!("{:x}", digest);
    hex[..16].to_string()
}

/// Decode a project directory name back to a filesystem path.
/// e.g. "-Users-alice-Code-myproject" -> "/Users/alice/Code/myproject"
///
/// The encoding replaced every path separator with `-`, which is lossy: a
/// path segment that itself contained `-` decodes wrong. That ambiguity is
/// accepted; the embedded per-record cwd field takes priority whenever the
/// transcript carries one, so this fallback only matters for transcripts
/// that never recorded a working directory.
pub fn decode_project_dir(name: &str) -> String {
    let stripped = name.strip_prefix('-').unwrap_or(name);
    if stripped.is_empty() {
        return String::new();
    }
    format!("/{}", stripped.replace('-', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn same_path_same_id() {
        let path = PathBuf::from("/home/alice/.claude/projects/-home-alice-proj/abc.jsonl");
        assert_eq!(session_file_id(&path), session_file_id(&path));
    }

    #[test]
    fn different_paths_different_ids() {
        let a = PathBuf::from("/tmp/a.jsonl");
        let b = PathBuf::from("/tmp/b.jsonl");
        assert_ne!(session_file_id(&a), session_file_id(&b));
    }

    #[test]
    fn id_is_short_hex() {
        let id = session_file_id(Path::new("/tmp/a.jsonl"));
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn decodes_encoded_dir_name() {
        assert_eq!(
            decode_project_dir("-Users-alice-Code-myproject"),
            "/Users/alice/Code/myproject"
        );
    }

    #[test]
    fn decode_handles_missing_leading_dash() {
        assert_eq!(decode_project_dir("tmp-work"), "/tmp/work");
    }

    #[test]
    fn decode_empty_name_is_empty() {
        assert_eq!(decode_project_dir("-"), "");
        assert_eq!(decode_project_dir(""), "");
    }

    #[test]
    fn decode_is_lossy_for_hyphenated_segments() {
        // Known limitation: "my-project" came back as "my/project".
        assert_eq!(
            decode_project_dir("-home-alice-my-project"),
            "/home/alice/my/project"
        );
    }
}
