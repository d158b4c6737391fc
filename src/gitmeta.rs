use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Optional repository metadata for a resolved project path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitMetadata {
    pub repo_name: Option<String>,
    pub branch: Option<String>,
}

/// Capability interface for git metadata lookups, so the refresh pipeline can
/// be tested without spawning real subprocesses.
pub trait GitProbe: Send + Sync {
    /// Best-effort enrichment. Never fails: any step that goes wrong leaves
    /// the corresponding field unset.
    fn enrich(&self, project_path: &str) -> impl Future<Output = GitMetadata> + Send;
}

/// Probe that shells out to the `git` binary. Every invocation is an
/// argv-array spawn (never a shell) with an enforced timeout, so a hung git
/// subprocess cannot stall the refresh pipeline indefinitely.
#[derive(Debug, Clone)]
pub struct SystemGit {
    timeout: Duration,
}

impl Default for SystemGit {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
        }
    }
}

impl SystemGit {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `git <args>` in `dir`, returning trimmed stdout on success.
    /// Non-zero exit, spawn failure, and timeout all collapse to `None`.
    async fn run_git(&self, dir: &str, args: &[&str]) -> Option<String> {
        let child = Command::new("git")
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!("git {:?} failed to spawn in {}: {}", args, dir, e);
                return None;
            }
            Err(_) => {
                warn!("git {:?} timed out after {:?} in {}", args, self.timeout, dir);
                return None;
            }
        };

        if !output.status.success() {
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            None
        } else {
            Some(stdout)
        }
    }
}

impl GitProbe for SystemGit {
    async fn enrich(&self, project_path: &str) -> GitMetadata {
        if contains_shell_metacharacters(project_path) {
            debug!(
                "Skipping git enrichment for suspicious path: {}",
                project_path
            );
            return GitMetadata::default();
        }
        if !Path::new(project_path).is_dir() {
            return GitMetadata::default();
        }

        // A .git entry existing is not enough; ask git itself.
        let inside = self
            .run_git(project_path, &["rev-parse", "--is-inside-work-tree"])
            .await;
        if inside.as_deref() != Some("true") {
            return GitMetadata::default();
        }

        let repo_name = match self
            .run_git(project_path, &["remote", "get-url", "origin"])
            .await
        {
            Some(url) => repo_name_from_remote(&url),
            None => last_path_segment(project_path),
        };

        let branch = self
            .run_git(project_path, &["rev-parse", "--abbrev-ref", "HEAD"])
            .await
            // Detached HEAD reports the literal sentinel, which is not a branch.
            .filter(|name| name != "HEAD");

        GitMetadata { repo_name, branch }
    }
}

/// Paths carrying shell metacharacters never reach a subprocess, even though
/// spawns are argv-array: the transcript is untrusted input and a path like
/// `/tmp/x;rm -rf ~` has no business being probed at all.
pub fn contains_shell_metacharacters(path: &str) -> bool {
    path.chars().any(|c| {
        matches!(
            c,
            ';' | '&' | '|' | '<' | '>' | '$' | '`' | '"' | '\'' | '\\' | '*' | '?' | '[' | ']'
                | '{' | '}' | '(' | ')' | '~' | '#' | '!' | '\n' | '\r'
        )
    })
}

/// "git@host:org/myrepo.git" -> "myrepo", "https://host/org/myrepo" -> "myrepo"
fn repo_name_from_remote(url: &str) -> Option<String> {
    let trimmed = url.strip_suffix(".git").unwrap_or(url);
    let last = trimmed
        .rsplit(|c: char| c == '/' || c == ':')
        .next()
        .filter(|s| !s.is_empty())?;
    Some(last.to_string())
}

fn last_path_segment(path: &str) -> Option<String> {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
}
