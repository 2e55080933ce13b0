//! Flat-file JSON REST service for campus records.
//!
//! Six collections (students, lecturers, courses, class sections,
//! enrollment records, users) are served from a single JSON document.
//! A read-only mode serves the bundled snapshot and rejects writes;
//! the default mode persists every accepted mutation back to disk.

pub mod api;
pub mod config;
pub mod handler;
pub mod logger;
pub mod server;
pub mod store;
