//! HTTP protocol layer module
//!
//! Response builders shared by the request handler, decoupled from the
//! dispatcher's own request and response types.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_405_response, build_413_response, build_500_response, build_504_response,
    build_options_response, build_web_response, ALLOWED_METHODS,
};
