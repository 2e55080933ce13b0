// Application state module
// Immutable configuration plus the shared document store

use std::path::PathBuf;
use tokio::sync::RwLock;

use super::types::Config;
use crate::store::DocumentStore;

/// Application state shared by every request handler
pub struct AppState {
    pub config: Config,
    /// In-memory document store; write-locked only by accepted mutations
    pub store: RwLock<DocumentStore>,
    /// Live database file that accepted mutations are persisted to
    pub db_path: PathBuf,
}

impl AppState {
    pub fn new(config: Config, store: DocumentStore, db_path: PathBuf) -> Self {
        Self {
            config,
            store: RwLock::new(store),
            db_path,
        }
    }

    /// Whether the store rejects write verbs
    pub const fn read_only(&self) -> bool {
        self.config.store.read_only
    }
}
