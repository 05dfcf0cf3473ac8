//! Error types
//!
//! One enum per layer: startup (configuration, instantiation, wiring, route
//! table), wiring, dispatch, and the operations invoked by the dispatcher.

use thiserror::Error;

/// Boxed error returned by component factories and user operations
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Fatal conditions raised while bringing the application up
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid address: {0}")]
    Address(String),

    #[error("failed to instantiate component `{component}`")]
    Instantiation {
        component: String,
        #[source]
        source: BoxError,
    },

    #[error("dependency wiring failed")]
    Wiring(#[from] WiringError),

    #[error("route `{path}` is declared by both `{first}` and `{second}`")]
    DuplicateRoute {
        path: String,
        first: String,
        second: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the dependency wiring engine
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WiringError {
    #[error("component `{component}` requires `{key}` for slot `{slot}`, but nothing is registered under that name")]
    Unresolved {
        component: String,
        slot: &'static str,
        key: String,
    },

    #[error("component `{component}`: `{key}` resolved to `{found}`, which does not provide `{expected}` for slot `{slot}`")]
    TypeMismatch {
        component: String,
        slot: &'static str,
        key: String,
        found: &'static str,
        expected: &'static str,
    },

    #[error("component `{component}`: slot `{slot}` is already bound to a different instance")]
    Rebound {
        component: String,
        slot: &'static str,
    },
}

/// Errors raised by a routed operation or by its argument accessors
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("argument #{index} is not a {expected} argument")]
    ArgumentKind { index: usize, expected: &'static str },

    #[error("required parameter `{name}` is missing")]
    MissingParameter { name: String },

    #[error("dependency `{slot}` ({capability}) was never resolved")]
    Unresolved {
        slot: &'static str,
        capability: &'static str,
    },

    #[error("owning instance is not a `{expected}`")]
    TargetMismatch { expected: &'static str },

    #[error("{0}")]
    Failed(String),

    #[error("operation error")]
    Other(#[from] BoxError),
}

/// Faults raised while dispatching a request to its operation
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("handler `{component}` for `{path}` is not registered")]
    MissingHandler { component: String, path: String },

    #[error("operation `{operation}` for `{path}` failed")]
    Operation {
        path: String,
        operation: String,
        #[source]
        source: OperationError,
    },
}

impl DispatchError {
    /// HTTP status the fault boundary answers with
    pub const fn status(&self) -> u16 {
        match self {
            Self::Operation {
                source: OperationError::MissingParameter { .. },
                ..
            } => 400,
            _ => 500,
        }
    }
}

/// Render an error and its source chain as a plain-text trace
pub fn render_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\n  caused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
