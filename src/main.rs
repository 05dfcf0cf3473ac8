use std::sync::Arc;

use mini_mvc::app::{AppSettings, Application};
use mini_mvc::config::{AppState, Config};
use mini_mvc::error::{render_chain, StartupError};
use mini_mvc::{demo, logger, server};

/// Config file used when none is given on the command line
const DEFAULT_CONFIG: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = Config::load_from(&config_path).map_err(StartupError::from)?;
    logger::init(&cfg.logging)?;

    // Create the Tokio runtime, sized by server.workers when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_debug(&format!("[Config] Using {workers} worker threads"));
    } else {
        logger::log_debug("[Config] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr().map_err(StartupError::Address)?;

    let application = Application::bootstrap(&AppSettings::from(&cfg), &demo::catalog())
        .inspect_err(|e| logger::log_error(&format!("Startup aborted: {}", render_chain(e))))?;
    let listener = server::create_reusable_listener(addr).map_err(StartupError::from)?;

    let routes: Vec<String> = application
        .routes()
        .paths()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    let routes: Vec<&str> = routes.iter().map(String::as_str).collect();
    logger::log_server_start(&addr, &cfg, &routes);

    let state = Arc::new(AppState::new(&cfg, application));
    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::run_server(listener, state, Arc::clone(&signals.shutdown)))
        .await;

    Ok(())
}
