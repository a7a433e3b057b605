//! Session registry
//!
//! Each session sits behind its own async mutex so one user's slow
//! completion never blocks another session.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::error::{Result, ServiceError};
use crate::session::DesignSession;

pub type SharedSession = Arc<Mutex<DesignSession>>;

#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SharedSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new empty session owned by `user_id`
    pub fn create(&self, user_id: &str) -> (String, SharedSession) {
        let session = DesignSession::new(user_id);
        let id = session.id().to_string();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().insert(id.clone(), shared.clone());
        log::info!("Opened session {} for user {}", id, user_id);
        (id, shared)
    }

    pub fn get(&self, id: &str) -> Result<SharedSession> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::SessionNotFound(id.to_string()))
    }

    pub fn remove(&self, id: &str) -> Option<SharedSession> {
        self.sessions.write().remove(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_get_remove() {
        let registry = SessionRegistry::new();
        let (id, session) = registry.create("u1");
        assert_eq!(session.lock().await.owner(), "u1");
        assert!(Arc::ptr_eq(&registry.get(&id).unwrap(), &session));

        registry.remove(&id);
        assert!(matches!(
            registry.get(&id),
            Err(ServiceError::SessionNotFound(_))
        ));
    }
}
