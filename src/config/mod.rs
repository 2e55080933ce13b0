// Configuration module entry point
// Layered loading: defaults, then config file, then environment overrides

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig, StoreConfig,
};

impl Config {
    /// Load configuration from the default `config` file plus environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Nested keys are addressed as `CAMPUS__SECTION__KEY` in the
    /// environment. The bare `PORT` and `DATA_DIR` variables used by the
    /// original hosting setup are honored as final overrides.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("CAMPUS").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3001)?
            .set_default("store.data_dir", "data")?
            .set_default("store.template", "db.json")?
            .set_default("store.read_only", false)?
            .set_default("http.path_prefix", "/api")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("site.static_dir", "dist")?
            .set_default("site.index_files", vec!["index.html".to_string()])?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?;

        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }
        if let Ok(data_dir) = std::env::var("DATA_DIR") {
            builder = builder.set_override("store.data_dir", data_dir)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
