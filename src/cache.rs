use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::index::SearchIndex;
use crate::model::{Message, Session, Snapshot};

/// Process-wide holder of the current snapshot.
///
/// Single-writer discipline: only the refresh pipeline calls [`update`],
/// replacing the whole (sessions, index, messages) triple behind one Arc
/// swap. Readers clone the Arc out of the lock and then work lock-free on an
/// immutable snapshot, so no reader can ever observe a session list paired
/// with an index from a different refresh cycle, and no reader blocks a
/// concurrent update for longer than the pointer swap.
///
/// [`update`]: SessionCache::update
#[derive(Debug)]
pub struct SessionCache {
    current: RwLock<Arc<Snapshot>>,
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCache {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Snapshot::empty()),
        }
    }

    /// Atomic full replace. Call sites outside the refresh pipeline are a bug.
    pub async fn update(
        &self,
        sessions: Vec<Session>,
        index: SearchIndex,
        messages: HashMap<String, Vec<Message>>,
    ) {
        let snapshot = Arc::new(Snapshot {
            sessions,
            index,
            messages,
        });
        *self.current.write().await = snapshot;
    }

    /// The currently installed snapshot, as an owned handle.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    pub async fn get_all_sessions(&self) -> Vec<Session> {
        self.snapshot().await.sessions.clone()
    }

    pub async fn get_session(&self, id: &str) -> Option<Session> {
        self.snapshot()
            .await
            .sessions
            .iter()
            .find(|session| session.id == id)
            .cloned()
    }

    /// Filter the session list by index membership, preserving the session
    /// list's order (the index's internal order is meaningless).
    pub async fn search_sessions(&self, query: &str) -> Vec<Session> {
        let snapshot = self.snapshot().await;
        let hits = snapshot.index.search(query);
        snapshot
            .sessions
            .iter()
            .filter(|session| hits.contains(&session.id))
            .cloned()
            .collect()
    }

    /// Message history for one session. Unknown ids get an empty list, never
    /// an error.
    pub async fn get_messages(&self, id: &str) -> Vec<Message> {
        self.snapshot()
            .await
            .messages
            .get(id)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ParsedSession, Role};
    use chrono::Utc;

    fn session(id: &str, display_name: &str) -> Session {
        Session {
            id: id.to_string(),
            session_id: format!("{}-log", id),
            display_name: display_name.to_string(),
            timestamp: Utc::now(),
            project_path: "/p".to_string(),
            message_count: 0,
            git_branch: None,
            git_repo_name: None,
        }
    }

    fn build_index(sessions: &[Session]) -> SearchIndex {
        let parsed: Vec<ParsedSession> = sessions
            .iter()
            .map(|s| ParsedSession {
                session: s.clone(),
                messages: vec![],
            })
            .collect();
        SearchIndex::build(&parsed, 15)
    }

    #[tokio::test]
    async fn update_replaces_everything_in_order() {
        let cache = SessionCache::new();
        let sessions = vec![session("b", "beta work"), session("a", "alpha work")];
        let index = build_index(&sessions);
        cache.update(sessions.clone(), index, HashMap::new()).await;

        assert_eq!(cache.get_all_sessions().await, sessions);
    }

    #[tokio::test]
    async fn search_preserves_session_list_order() {
        let cache = SessionCache::new();
        let sessions = vec![
            session("s3", "work on parser"),
            session("s1", "work on cache"),
            session("s2", "unrelated"),
        ];
        let index = build_index(&sessions);
        cache.update(sessions, index, HashMap::new()).await;

        let hits = cache.search_sessions("work").await;
        let ids: Vec<&str> = hits.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s3", "s1"]);
    }

    #[tokio::test]
    async fn unknown_id_gets_empty_messages() {
        let cache = SessionCache::new();
        assert!(cache.get_messages("nope").await.is_empty());
        assert!(cache.get_session("nope").await.is_none());
    }

    #[tokio::test]
    async fn messages_survive_for_known_ids() {
        let cache = SessionCache::new();
        let sessions = vec![session("s1", "with messages")];
        let index = build_index(&sessions);
        let mut messages = HashMap::new();
        messages.insert(
            "s1".to_string(),
            vec![Message {
                role: Role::User,
                content: "hello".to_string(),
                timestamp: None,
            }],
        );
        cache.update(sessions, index, messages).await;

        let fetched = cache.get_messages("s1").await;
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].content, "hello");
    }
}
