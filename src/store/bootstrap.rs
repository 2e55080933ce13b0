// Database bootstrap module
// Resolves which database file this process serves from

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::StoreConfig;
use crate::logger;

/// Name of the live database file inside the data directory
const DB_FILE_NAME: &str = "db.json";

/// Resolve the database file for the configured deployment mode.
///
/// Read-only mode serves the bundled template in place. Write mode ensures
/// the data directory exists and seeds it from the template on first run,
/// so mutations never touch the bundled file.
pub fn prepare_database(config: &StoreConfig) -> io::Result<PathBuf> {
    if config.read_only {
        return Ok(PathBuf::from(&config.template));
    }

    let data_dir = Path::new(&config.data_dir);
    if !data_dir.exists() {
        fs::create_dir_all(data_dir)?;
        logger::log_data_dir_created(data_dir);
    }

    let db_file = data_dir.join(DB_FILE_NAME);
    if db_file.exists() {
        logger::log_database_existing(&db_file);
    } else {
        fs::copy(&config.template, &db_file)?;
        logger::log_database_initialized(&db_file);
    }
    Ok(db_file)
}
