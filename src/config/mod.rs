// Configuration module entry point
// Loads layered configuration: file, then environment, then defaults

mod types;

use std::net::SocketAddr;

// Re-export public types
pub use types::{Config, FilesConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Configuration file used when none is given (extension is resolved by the loader)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from the default `config.toml`
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional. `RESPONDER__SERVER__PORT=9000` style environment
    /// variables override it.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("RESPONDER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.backlog", 128)?
            .set_default("files.root", "static")?
            .set_default("files.index_files", vec!["index.html", "index.htm"])?
            .set_default("files.health_path", "/healthz")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.max_request_head", 8192)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
