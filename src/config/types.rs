// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub files: FilesConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads, CPU cores when unset
    #[serde(default)]
    pub workers: Option<usize>,
    /// Listen backlog queue size
    pub backlog: i32,
}

/// Static file configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct FilesConfig {
    /// Document root every request target is resolved against
    pub root: String,
    /// Files tried, in order, when a target names a directory
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
    /// Path answered with a JSON liveness document
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_path() -> String {
    "/healthz".to_string()
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root: "static".to_string(),
            index_files: default_index_files(),
            health_path: default_health_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    /// Seconds allowed for a client to send its request head
    pub read_timeout: u64,
    /// Largest accepted request head in bytes
    pub max_request_head: usize,
}
