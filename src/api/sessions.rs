//! In-memory session store
//!
//! Each session is owned by one user and never shares state with another.
//! Callers must not hold the lock across a narrative call: read what is needed
//! with [`SessionStore::update`], await the model, then update again.

use crate::narrative::ChatSession;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, ChatSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session and return its id
    pub async fn create(&self) -> Uuid {
        let session = ChatSession::new();
        let id = session.id;
        self.sessions.write().await.insert(id, session);
        id
    }

    /// Snapshot of a session
    pub async fn get(&self, id: Uuid) -> Option<ChatSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Run `f` on the session under the write lock
    pub async fn update<F, R>(&self, id: Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&mut ChatSession) -> R,
    {
        self.sessions.write().await.get_mut(&id).map(f)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
