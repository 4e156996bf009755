//! Session context and its lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::retrieval::DocumentIndex;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No index; questions are rejected
    Idle,
    /// An index exists and questions are accepted
    DocumentsProcessed,
    /// A question is being answered
    Answering,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::DocumentsProcessed => "documents processed",
            Self::Answering => "answering",
        };
        f.write_str(label)
    }
}

/// Mutable per-session context
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    index: Option<Arc<DocumentIndex>>,
    processed_files: Vec<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            index: None,
            processed_files: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn index(&self) -> Option<&Arc<DocumentIndex>> {
        self.index.as_ref()
    }

    pub fn processed_files(&self) -> &[String] {
        &self.processed_files
    }

    /// Replace any previous index wholesale
    pub fn install(&mut self, index: DocumentIndex, processed_files: Vec<String>) {
        self.index = Some(Arc::new(index));
        self.processed_files = processed_files;
        self.state = SessionState::DocumentsProcessed;
    }

    /// Enter `Answering`, returning the index to query. `None` when idle.
    pub fn begin_answering(&mut self) -> Option<Arc<DocumentIndex>> {
        let index = self.index.clone()?;
        self.state = SessionState::Answering;
        Some(index)
    }

    /// Leave `Answering`, whether or not the answer succeeded
    pub fn finish_answering(&mut self) {
        if self.state == SessionState::Answering {
            self.state = SessionState::DocumentsProcessed;
        }
    }

    /// Drop the index and file list
    pub fn clear(&mut self) {
        self.index = None;
        self.processed_files.clear();
        self.state = SessionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::HashingEmbedder;
    use crate::retrieval::{memory_store_factory, IndexBuilder};
    use crate::types::Chunk;

    async fn index() -> DocumentIndex {
        IndexBuilder::new(Arc::new(HashingEmbedder::new(16)), memory_store_factory(), 4, 3)
            .build(vec![Chunk::new(0, "hello".to_string(), 0, 5)])
            .await
            .unwrap()
    }

    #[test]
    fn test_idle_session_cannot_answer() {
        let mut session = Session::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.begin_answering().is_none());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let mut session = Session::new();
        session.install(index().await, vec!["a.txt".to_string()]);
        assert_eq!(session.state(), SessionState::DocumentsProcessed);

        assert!(session.begin_answering().is_some());
        assert_eq!(session.state(), SessionState::Answering);
        session.finish_answering();
        assert_eq!(session.state(), SessionState::DocumentsProcessed);

        session.clear();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.index().is_none());
        assert!(session.processed_files().is_empty());
    }

    #[tokio::test]
    async fn test_reprocessing_replaces_index() {
        let mut session = Session::new();
        session.install(index().await, vec!["a.txt".to_string()]);
        let first = session.index().map(|i| i.id());

        session.install(index().await, vec!["b.txt".to_string()]);
        assert_ne!(session.index().map(|i| i.id()), first);
        assert_eq!(session.processed_files(), ["b.txt".to_string()]);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::DocumentsProcessed.to_string(), "documents processed");
    }
}
