use std::sync::Arc;

use crate::credentials::CredentialStore;
use crate::session::SessionManager;
use crate::store::{MemoryStore, TaskStoreRef};

#[derive(Clone)]
pub struct AppState {
    pub users: CredentialStore,
    pub tasks: TaskStoreRef,
    pub sessions: SessionManager,
    /// Name of the backing store, reported by `/health`.
    pub backend: &'static str,
}

impl AppState {
    /// Fresh in-memory state, used when no database is configured.
    pub fn in_memory(sessions: SessionManager) -> Self {
        let store = Arc::new(MemoryStore::new());

        Self {
            users: CredentialStore::new(store.clone()),
            tasks: store,
            sessions,
            backend: "memory",
        }
    }
}
