//! Log writer module
//!
//! Routes access and error lines to stdout/stderr or append-mode files,
//! chosen once at startup from the logging configuration.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use crate::config::LoggingConfig;

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// One output: a standard stream or an append-mode log file
enum Target {
    Console { errors: bool },
    File(Mutex<File>),
}

impl Target {
    fn for_path(path: Option<&str>, errors: bool) -> io::Result<Self> {
        match path {
            Some(path) => Ok(Self::File(Mutex::new(open_append(path)?))),
            None => Ok(Self::Console { errors }),
        }
    }

    fn write_line(&self, line: &str) {
        match self {
            Self::Console { errors: false } => println!("{line}"),
            Self::Console { errors: true } => eprintln!("{line}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{line}");
                }
            }
        }
    }
}

/// Thread-safe writer with separate access and error targets
pub struct LogWriter {
    access: Target,
    error: Target,
}

impl LogWriter {
    fn from_config(logging: &LoggingConfig) -> io::Result<Self> {
        Ok(Self {
            access: Target::for_path(logging.access_log_file.as_deref(), false)?,
            error: Target::for_path(logging.error_log_file.as_deref(), true)?,
        })
    }

    /// Access log lines, and lifecycle messages that belong next to them
    pub fn write_access(&self, line: &str) {
        self.access.write_line(line);
    }

    pub fn write_error(&self, line: &str) {
        self.error.write_line(line);
    }
}

/// Open a log file for appending, creating parent directories as needed
fn open_append(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer once at startup
pub fn init(logging: &LoggingConfig) -> io::Result<()> {
    let writer = LogWriter::from_config(logging)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// The global log writer, if initialized
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}
