//! Logger module
//!
//! Lifecycle, store, and error messages plus the per-request access log.
//! Output goes to stdout/stderr or to the configured log files.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use std::path::Path;

/// Open the configured log targets. Called once before any request.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(&config.logging)
}

/// Lifecycle messages share the access log target
fn write_info(message: &str) {
    write_access(message);
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log
fn write_access(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, db_path: &Path) {
    write_info("======================================");
    write_info("Campus API server started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("API prefix: {}", config.http.path_prefix));
    write_info(&format!("Database: {}", db_path.display()));
    if config.store.read_only {
        write_info("Mode: read-only snapshot (write verbs rejected)");
    } else {
        write_info("Mode: read-write (mutations persist to the database file)");
    }
    if let Some(ref dir) = config.site.static_dir {
        write_info(&format!("Static site: {dir}"));
    }
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_server_stop() {
    write_info("[SERVER] Accept loop stopped");
}

pub fn log_store_loaded(path: &Path, summary: &str) {
    write_info(&format!("[STORE] Loaded {summary} from {}", path.display()));
}

pub fn log_data_dir_created(dir: &Path) {
    write_info(&format!("[STORE] Created data directory: {}", dir.display()));
}

pub fn log_database_initialized(path: &Path) {
    write_info(&format!(
        "[STORE] Database initialized from template: {}",
        path.display()
    ));
}

pub fn log_database_existing(path: &Path) {
    write_info(&format!("[STORE] Using existing database: {}", path.display()));
}

pub fn log_shutdown(signal: &str) {
    write_info(&format!("\n[SIGNAL] {signal} received, shutting down"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// One formatted access log line per answered request
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
