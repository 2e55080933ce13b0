// Document store module entry point
// Flat-file JSON database: loading, matching, persistence, bootstrap

mod bootstrap;
mod document;

// Re-export public types
pub use bootstrap::prepare_database;
pub use document::{
    id_matches, loose_eq, loose_text, matches_filters, next_id, position_by_id, DocumentStore,
    LoadError,
};
