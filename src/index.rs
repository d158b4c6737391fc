use std::collections::{HashMap, HashSet};

use crate::model::ParsedSession;

/// Default cap on how many messages per session feed the search text.
pub const DEFAULT_MAX_MESSAGES_TO_INDEX: usize = 15;

/// Substring search index: one lowercase document per session.
///
/// Construction is a pure function of the parsed sessions and the message
/// cap; there is no incremental update path. A fresh index is built on every
/// refresh and swapped in together with the session list.
#[derive(Debug, Default)]
pub struct SearchIndex {
    documents: HashMap<String, String>,
}

impl SearchIndex {
    /// Build one searchable document per session: display name, project
    /// path, optional repo name and branch, plus the bodies of the first
    /// `max_messages` messages. Everything is lowercased once at build time.
    pub fn build(sessions: &[ParsedSession], max_messages: usize) -> Self {
        let mut documents = HashMap::with_capacity(sessions.len());
        for parsed in sessions {
            let session = &parsed.session;
            let mut text = String::new();
            text.push_str(&session.display_name);
            text.push(' ');
            text.push_str(&session.project_path);
            if let Some(repo) = &session.git_repo_name {
                text.push(' ');
                text.push_str(repo);
            }
            if let Some(branch) = &session.git_branch {
                text.push(' ');
                text.push_str(branch);
            }
            for message in parsed.messages.iter().take(max_messages) {
                text.push(' ');
                text.push_str(&message.content);
            }
            documents.insert(session.id.clone(), text.to_lowercase());
        }
        Self { documents }
    }

    /// Case-insensitive substring match over every document. The empty query
    /// matches nothing -- never "everything" and never an error. Results are
    /// unordered; display ordering belongs to the session list.
    pub fn search(&self, query: &str) -> HashSet<String> {
        if query.is_empty() {
            return HashSet::new();
        }
        let needle = query.to_lowercase();
        self.documents
            .iter()
            .filter(|(_, doc)| doc.contains(&needle))
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
