//! In-memory `SessionStore` implementation.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, SessionId, SessionStore};

/// Records completed sessions; the real session lifecycle lives in the
/// external CRUD service.
pub struct InMemorySessionStore {
    completed: Mutex<HashSet<SessionId>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            completed: Mutex::new(HashSet::new()),
        }
    }

    pub async fn is_completed(&self, session: &SessionId) -> bool {
        let completed = self.completed.lock().await;
        completed.contains(session)
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn complete_session(&self, session: &SessionId) -> Result<(), RepositoryError> {
        let mut completed = self.completed.lock().await;
        completed.insert(session.clone());
        tracing::info!("Session '{}' marked completed", session);
        Ok(())
    }
}
