//! Route table
//!
//! Built once from the wired registry; read-only afterwards.

use std::collections::HashMap;

use super::mapping::Operation;
use super::path::compose;
use crate::container::{ComponentRegistry, Role};
use crate::error::StartupError;
use crate::logger;

/// What to do when two operations compose to the same path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// The operation registered later replaces the earlier one
    #[default]
    LastWins,
    /// Abort the build with [`StartupError::DuplicateRoute`]
    Reject,
}

/// Path binding to a handler operation
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub path: String,
    /// Registry name of the owning handler
    pub component: String,
    pub operation: Operation,
}

/// Normalized path -> route entry
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteEntry>,
}

impl RouteTable {
    /// Collect the routes of every handler in the registry
    pub fn build(registry: &ComponentRegistry, policy: CollisionPolicy) -> Result<Self, StartupError> {
        let mut table = Self::default();

        for (name, handle) in registry.components() {
            if handle.role() != Role::Handler {
                continue;
            }
            let Some(mapping) = handle.mapping() else {
                continue;
            };
            if !registry.is_primary(handle) {
                logger::log_warning(&format!(
                    "[Routes] handler `{name}` was replaced by a later registration; its routes are not mapped"
                ));
                continue;
            }

            for descriptor in mapping.routes() {
                let Some(sub_path) = descriptor.path() else {
                    continue;
                };
                let entry = RouteEntry {
                    path: compose(mapping.base_path(), sub_path),
                    component: name.to_string(),
                    operation: descriptor.operation().clone(),
                };
                table.insert(entry, policy)?;
            }
        }

        Ok(table)
    }

    fn insert(&mut self, entry: RouteEntry, policy: CollisionPolicy) -> Result<(), StartupError> {
        if let Some(existing) = self.routes.get(&entry.path) {
            if policy == CollisionPolicy::Reject {
                return Err(StartupError::DuplicateRoute {
                    path: entry.path,
                    first: existing.component.clone(),
                    second: entry.component,
                });
            }
            logger::log_warning(&format!(
                "[Routes] {} from `{}` replaces `{}.{}`",
                entry.path,
                entry.component,
                existing.component,
                existing.operation.name()
            ));
        }
        logger::log_info(&format!(
            "[Routes] {} -> {}.{}",
            entry.path,
            entry.component,
            entry.operation.name()
        ));
        self.routes.insert(entry.path.clone(), entry);
        Ok(())
    }

    /// Entry for an already normalized path
    pub fn get(&self, path: &str) -> Option<&RouteEntry> {
        self.routes.get(path)
    }

    /// Registered paths, sorted
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Component, ComponentDefinition};
    use crate::dispatch::{HandlerMapping, Invocation, RouteDescriptor};
    use crate::error::OperationError;

    struct First;
    struct Second;
    struct Helper;

    impl Component for First {}
    impl Component for Second {}
    impl Component for Helper {}

    fn ok<C>(_: &C, _: &mut Invocation<'_>) -> Result<(), OperationError> {
        Ok(())
    }

    fn registry_with(defs: &[ComponentDefinition]) -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.populate(defs).unwrap();
        registry
    }

    fn first() -> ComponentDefinition {
        ComponentDefinition::handler(|| Ok(First))
            .mapping(
                HandlerMapping::at("/demo/")
                    .route(RouteDescriptor::new("query", "//query", vec![], ok::<First>))
                    .route(RouteDescriptor::unrouted("helper", vec![], ok::<First>)),
            )
            .build()
    }

    fn second() -> ComponentDefinition {
        ComponentDefinition::handler(|| Ok(Second))
            .mapping(
                HandlerMapping::at("demo")
                    .route(RouteDescriptor::new("other", "query/", vec![], ok::<Second>)),
            )
            .build()
    }

    #[test]
    fn test_build_composes_normalized_paths() {
        let table = RouteTable::build(&registry_with(&[first()]), CollisionPolicy::LastWins).unwrap();
        assert_eq!(table.paths(), vec!["/demo/query"]);
        let entry = table.get("/demo/query").unwrap();
        assert_eq!(entry.component, "first");
        assert_eq!(entry.operation.name(), "query");
    }

    #[test]
    fn test_services_and_unmapped_handlers_add_no_routes() {
        let service = ComponentDefinition::service(|| Ok(Helper))
            .mapping(HandlerMapping::root().route(RouteDescriptor::new("x", "x", vec![], ok::<Helper>)))
            .build();
        let bare = ComponentDefinition::handler(|| Ok(Second)).build();
        let table =
            RouteTable::build(&registry_with(&[service, bare]), CollisionPolicy::LastWins).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_handler_replaced_under_its_name_adds_no_routes() {
        let replacement = ComponentDefinition::handler(|| Ok(Second))
            .named("first")
            .mapping(
                HandlerMapping::at("other")
                    .route(RouteDescriptor::new("other", "route", vec![], ok::<Second>)),
            )
            .build();
        let original = first().instantiate().unwrap();
        let mut registry = ComponentRegistry::new();
        // The replaced handler stays reachable under a second key
        registry.register_alias("legacyFirst", original.clone());
        registry.register("first", original);
        registry.populate(&[replacement]).unwrap();
        assert_eq!(registry.components().len(), 2);

        let table = RouteTable::build(&registry, CollisionPolicy::Reject).unwrap();
        assert_eq!(table.paths(), vec!["/other/route"]);
        assert_eq!(table.get("/other/route").unwrap().component, "first");
    }

    #[test]
    fn test_collision_last_registered_wins() {
        let table =
            RouteTable::build(&registry_with(&[first(), second()]), CollisionPolicy::LastWins).unwrap();
        assert_eq!(table.len(), 1);
        let entry = table.get("/demo/query").unwrap();
        assert_eq!(entry.component, "second");
        assert_eq!(entry.operation.name(), "other");
    }

    #[test]
    fn test_collision_rejected_when_configured() {
        let err = RouteTable::build(&registry_with(&[first(), second()]), CollisionPolicy::Reject)
            .unwrap_err();
        match err {
            StartupError::DuplicateRoute { path, first, second } => {
                assert_eq!(path, "/demo/query");
                assert_eq!(first, "first");
                assert_eq!(second, "second");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
