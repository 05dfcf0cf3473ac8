//! Application lifetime
//!
//! Runs the startup sequence (discovery, registration, wiring, route build)
//! exactly once and owns the frozen result. [`Application::serve`] is the
//! fault boundary every request passes through.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::config::Config;
use crate::container::{wire_all, ComponentRegistry, WiringPolicy};
use crate::discovery::ComponentCatalog;
use crate::dispatch::{CollisionPolicy, Dispatcher, ParamBinding, RouteTable, WebRequest, WebResponse};
use crate::error::{render_chain, StartupError};
use crate::logger;

/// Startup knobs taken from the `container` and `server` config sections
#[derive(Debug, Clone, Default)]
pub struct AppSettings {
    pub scan_package: String,
    pub wiring: WiringPolicy,
    pub binding: ParamBinding,
    pub collisions: CollisionPolicy,
    pub context_path: String,
}

impl From<&Config> for AppSettings {
    fn from(config: &Config) -> Self {
        let container = &config.container;
        Self {
            scan_package: container.scan_package.clone(),
            wiring: if container.strict_wiring {
                WiringPolicy::Strict
            } else {
                WiringPolicy::Lenient
            },
            binding: container.param_binding,
            collisions: if container.reject_duplicate_routes {
                CollisionPolicy::Reject
            } else {
                CollisionPolicy::LastWins
            },
            context_path: config.server.context_path.clone(),
        }
    }
}

/// Started application: frozen registry, route table and dispatcher
pub struct Application {
    registry: Arc<ComponentRegistry>,
    routes: Arc<RouteTable>,
    dispatcher: Dispatcher,
}

impl Application {
    /// Run the startup sequence against `catalog`
    ///
    /// Any failure aborts startup; no partially wired application is
    /// returned.
    pub fn bootstrap(settings: &AppSettings, catalog: &ComponentCatalog) -> Result<Self, StartupError> {
        let definitions = catalog.scan(&settings.scan_package);

        let mut registry = ComponentRegistry::new();
        let count = registry.populate(definitions)?;
        logger::log_info(&format!(
            "[Registry] {count} component(s) registered, {} lookup key(s)",
            registry.len()
        ));

        let report = wire_all(&registry, settings.wiring)?;
        logger::log_info(&format!(
            "[Wiring] {} dependency slot(s) bound, {} unresolved",
            report.bound,
            report.unresolved.len()
        ));

        let routes = RouteTable::build(&registry, settings.collisions)?;
        logger::log_info(&format!("[Routes] {} route(s) mapped", routes.len()));

        let registry = Arc::new(registry);
        let routes = Arc::new(routes);
        let dispatcher = Dispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&routes),
            settings.context_path.as_str(),
            settings.binding,
        );

        Ok(Self {
            registry,
            routes,
            dispatcher,
        })
    }

    /// Dispatch one request, converting faults and panics into responses
    pub fn serve(&self, request: &WebRequest) -> WebResponse {
        let mut response = WebResponse::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.dispatcher.dispatch(request, &mut response)
        }));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                let trace = render_chain(&err);
                logger::log_error(&format!("[Dispatch] {} {}: {trace}", request.method(), request.path()));
                write_fault(&mut response, err.status(), &trace);
            }
            Err(payload) => {
                let trace = format!("operation panicked: {}", panic_message(payload.as_ref()));
                logger::log_error(&format!("[Dispatch] {} {}: {trace}", request.method(), request.path()));
                write_fault(&mut response, 500, &trace);
            }
        }
        response
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

fn write_fault(response: &mut WebResponse, status: u16, trace: &str) {
    let title = match status {
        400 => "400 Bad Request:",
        _ => "500 Exception Detail:",
    };
    response.reset();
    response.set_status(status);
    response.write(title);
    response.write("\n");
    response.write(trace);
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
