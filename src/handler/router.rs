//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method
//! validation, body limits, and handing the request to the application.

use crate::app::Application;
use crate::config::AppState;
use crate::dispatch::WebRequest;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes, Incoming};
use hyper::header::HeaderMap;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), ToString::to_string);
    let user_agent = header_value(&req, "user-agent");

    let mut entry = AccessLogEntry::new(peer_addr.to_string(), method.to_string(), req.uri().path().to_string());
    entry.query = req.uri().query().map(ToString::to_string);
    entry.user_agent = user_agent;

    let response = process(req, &method, &target, &state, &mut entry).await;

    if state.cached_access_log.load(Ordering::Relaxed) {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn process(
    req: Request<Incoming>,
    method: &Method,
    target: &str,
    state: &Arc<AppState>,
    entry: &mut AccessLogEntry,
) -> Response<Full<Bytes>> {
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(method) {
        return resp;
    }

    // 2. Check body size
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(req.headers(), max_body_size) {
        return resp;
    }

    // 3. Build the dispatcher request, merging a form body into the parameters
    let is_form = *method == Method::POST
        && header_value(&req, "content-type").is_some_and(|ct| is_form_content_type(&ct));
    let mut web_request = WebRequest::new(method.as_str(), target);
    if is_form {
        match read_form(req.into_body(), max_body_size).await {
            Ok(form) => web_request = web_request.with_form(&form),
            Err(resp) => return resp,
        }
    }

    let application = Arc::clone(&state.application);
    entry.handler = application
        .dispatcher()
        .resolve(&web_request)
        .map(|route| format!("{}.{}", route.component, route.operation.name()));

    // 4. Run the operation on the blocking pool under the configured deadline
    dispatch_with_deadline(
        application,
        web_request,
        state.handler_timeout(),
        &state.config.http.server_name,
        *method == Method::HEAD,
    )
    .await
}

/// Collect an urlencoded form body, enforcing `max_body_size`
async fn read_form<B>(body: B, max_body_size: u64) -> Result<String, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return Err(http::build_500_response(&e.to_string()));
        }
    };
    if u64::try_from(body.len()).unwrap_or(u64::MAX) > max_body_size {
        logger::log_error(&format!(
            "Request body too large: {} bytes (max: {max_body_size})",
            body.len()
        ));
        return Err(http::build_413_response());
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Serve `request` on the blocking pool, answering 504 once `deadline` passes
///
/// An operation that misses the deadline is not cancelled: it keeps its
/// blocking thread until it returns, and its response is dropped.
async fn dispatch_with_deadline(
    application: Arc<Application>,
    request: WebRequest,
    deadline: Option<Duration>,
    server_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let target = request.path().to_string();
    let task = tokio::task::spawn_blocking(move || application.serve(&request));
    let outcome = match deadline {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                logger::log_warning(&format!(
                    "Operation for {target} exceeded {}ms deadline; it is still running and its result will be discarded",
                    limit.as_millis()
                ));
                return http::build_504_response();
            }
        },
        None => task.await,
    };

    match outcome {
        Ok(web) => http::build_web_response(web, server_name, is_head),
        Err(e) => {
            logger::log_error(&format!("Operation task for {target} failed: {e}"));
            http::build_500_response(&e.to_string())
        }
    }
}

fn header_value(req: &Request<Incoming>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn is_form_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// Check HTTP method and return the response for methods the dispatcher never sees
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD | Method::POST => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}
