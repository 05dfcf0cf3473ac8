// Application state module
// Shared, read-only state handed to every connection

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use super::types::Config;
use crate::app::Application;

/// Server state shared by all connections
pub struct AppState {
    pub config: Config,
    /// Started application: frozen registry and route table
    pub application: Arc<Application>,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: &Config, application: Application) -> Self {
        Self {
            config: config.clone(),
            application: Arc::new(application),
            cached_access_log: Arc::new(AtomicBool::new(config.logging.access_log)),
        }
    }

    /// Deadline for one routed operation, if configured
    ///
    /// Missing it answers 504 but does not cancel the operation, which runs
    /// to completion on the blocking pool.
    pub const fn handler_timeout(&self) -> Option<Duration> {
        match self.config.performance.handler_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}
