// Server loop module
// Accepts connections until a shutdown signal arrives, then drains

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Poll interval while waiting for open connections to finish
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Accept loop; must run inside a `LocalSet`.
///
/// Returns after `shutdown` fires and open connections have closed or the
/// drain grace period (`performance.write_timeout`) has passed.
pub async fn run_server(listener: TcpListener, state: Arc<AppState>, shutdown: Arc<Notify>) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            () = shutdown.notified() => break,
        }
    }

    logger::log_shutdown();
    drop(listener);
    drain(&active_connections, Duration::from_secs(state.config.performance.write_timeout)).await;
}

async fn drain(active_connections: &AtomicUsize, grace: Duration) {
    let deadline = tokio::time::Instant::now() + grace;
    loop {
        let open = active_connections.load(Ordering::SeqCst);
        if open == 0 {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!("[Shutdown] {open} connection(s) still open after grace period"));
            return;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}
