//! Demo components
//!
//! A greeting service and a controller exposing it at `/demo/query`.

mod controller;
mod service;

pub use controller::DemoController;
pub use service::{DemoService, DemoServiceImpl};

use crate::container::ComponentDefinition;
use crate::discovery::ComponentCatalog;
use crate::dispatch::{ArgKind, HandlerMapping, RouteDescriptor};

/// Catalog holding the demo service and controller
pub fn catalog() -> ComponentCatalog {
    ComponentCatalog::new()
        .with(
            ComponentDefinition::service(|| Ok(DemoServiceImpl))
                .provides::<dyn DemoService>(|c| c),
        )
        .with(
            ComponentDefinition::handler(|| Ok(DemoController::new())).mapping(
                HandlerMapping::at("demo").route(RouteDescriptor::new(
                    "query",
                    "query",
                    vec![ArgKind::Request, ArgKind::Response, ArgKind::param("name")],
                    DemoController::query,
                )),
            ),
        )
}
