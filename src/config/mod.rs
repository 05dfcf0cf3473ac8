// Configuration module entry point
// Loads the layered configuration and holds the shared server state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, ContainerConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Prefix of environment overrides, e.g. `MVC_SERVER__PORT`
const ENV_PREFIX: &str = "MVC";

impl Config {
    /// Load configuration from specified file path (without extension),
    /// overlaid by `MVC_`-prefixed process environment variables
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, None)
    }

    /// Like [`Config::load_from`], reading overrides from `vars` instead of
    /// the process environment when given
    pub fn load_with_env(
        config_path: &str,
        vars: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .source(vars);

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(environment)
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.context_path", "")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.handler_timeout_ms", 10_000)?
            .set_default("http.server_name", "mini-mvc/0.1")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("container.scan_package", "mini_mvc::demo")?
            .set_default("container.strict_wiring", true)?
            .set_default("container.param_binding", "by_name")?
            .set_default("container.reject_duplicate_routes", false)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ParamBinding;

    fn load_isolated(vars: &[(&str, &str)]) -> Config {
        let vars = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::load_with_env("does-not-exist/mini-mvc", Some(vars)).unwrap()
    }

    #[test]
    fn test_defaults_without_config_file() {
        let cfg = load_isolated(&[]);
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.context_path, "");
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.container.scan_package, "mini_mvc::demo");
        assert!(cfg.container.strict_wiring);
        assert_eq!(cfg.container.param_binding, ParamBinding::ByName);
        assert!(!cfg.container.reject_duplicate_routes);
        assert_eq!(cfg.performance.handler_timeout_ms, 10_000);
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = load_isolated(&[]);
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8080);
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }

    #[test]
    fn test_environment_overrides_use_single_underscore_prefix() {
        let cfg = load_isolated(&[
            ("MVC_SERVER__PORT", "9191"),
            ("MVC_CONTAINER__SCAN_PACKAGE", "from_single"),
            ("MVC_CONTAINER__STRICT_WIRING", "false"),
            ("MVC_CONTAINER__PARAM_BINDING", "last_entry"),
        ]);
        assert_eq!(cfg.server.port, 9191);
        assert_eq!(cfg.container.scan_package, "from_single");
        assert!(!cfg.container.strict_wiring);
        assert_eq!(cfg.container.param_binding, ParamBinding::LastEntry);
    }

    #[test]
    fn test_unprefixed_variables_are_ignored() {
        let cfg = load_isolated(&[("SERVER__PORT", "9292"), ("OTHER_SERVER__PORT", "9393")]);
        assert_eq!(cfg.server.port, 8080);
    }
}
