//! HTTP response building module
//!
//! Converts dispatcher output into hyper responses and builds the
//! transport-level status responses that never reach the dispatcher.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::dispatch::WebResponse;

/// Methods routed to the dispatcher, plus OPTIONS
pub const ALLOWED_METHODS: &str = "GET, HEAD, POST, OPTIONS";

/// Convert a dispatcher response; HEAD keeps headers but drops the body
pub fn build_web_response(web: WebResponse, server_name: &str, is_head: bool) -> Response<Full<Bytes>> {
    let status = web.status();
    let content_type = web.content_type().to_string();
    let body = web.into_body();
    let content_length = body.len();
    let body = if is_head { Bytes::new() } else { Bytes::from(body) };

    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("Server", server_name)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(&status.to_string(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    build_text_response(405, "405 Method Not Allowed")
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(204)
        .header("Allow", ALLOWED_METHODS)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_text_response(413, "413 Payload Too Large")
}

/// Build 504 response for an operation that ran past its deadline
pub fn build_504_response() -> Response<Full<Bytes>> {
    build_text_response(504, "504 Gateway Timeout")
}

/// Build 500 response for a request that never produced a result
pub fn build_500_response(detail: &str) -> Response<Full<Bytes>> {
    build_text_response(500, &format!("500 Exception Detail:\n{detail}"))
}

fn build_text_response(status: u16, text: &str) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "text/plain");
    if status == 405 {
        builder = builder.header("Allow", ALLOWED_METHODS);
    }

    builder
        .body(Full::new(Bytes::from(text.to_string())))
        .unwrap_or_else(|e| {
            log_build_error(&status.to_string(), &e);
            Response::new(Full::new(Bytes::from(text.to_string())))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
