//! Request handler module
//!
//! Bridges hyper requests to the application: method and size checks, form
//! decoding, the blocking-pool dispatch under a deadline, and access logging.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
