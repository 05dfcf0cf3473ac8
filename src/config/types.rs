// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

use crate::dispatch::ParamBinding;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub container: ContainerConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Mount prefix stripped from request paths before routing
    #[serde(default)]
    pub context_path: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Minimum level: error, warn, info, debug
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
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    /// Deadline for a single routed operation, in milliseconds (0 = none)
    pub handler_timeout_ms: u64,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}

/// Container and dispatcher behaviour
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Root module path whose components are registered (`::` or `.` separated)
    pub scan_package: String,
    /// Fail startup when a dependency cannot be resolved
    pub strict_wiring: bool,
    pub param_binding: ParamBinding,
    /// Fail startup when two operations map to the same path
    pub reject_duplicate_routes: bool,
}
