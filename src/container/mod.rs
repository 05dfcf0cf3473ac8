//! Component container
//!
//! Holds component instances by name and capability, and wires their
//! dependency slots:
//! - `definition`: declarative component descriptions and the `Component` trait
//! - `registry`: name/capability keyed store
//! - `slot`: write-once dependency cells
//! - `wiring`: slot resolution against the registry

mod definition;
mod naming;
mod registry;
mod slot;
mod wiring;

pub use definition::{Component, ComponentDefinition, DefinitionBuilder, Role};
pub use naming::{capability_id, default_name, simple_name};
pub use registry::{ComponentHandle, ComponentRegistry};
pub use slot::{BindError, DependencySlot, Inject};
pub use wiring::{wire_all, WiringPolicy, WiringReport};
