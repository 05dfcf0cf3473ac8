//! Component discovery
//!
//! Components are declared up front in a [`ComponentCatalog`]. The scan
//! keeps the definitions whose type lives under the configured package, in
//! catalog order.

use crate::container::ComponentDefinition;
use crate::logger;

/// Ordered set of discoverable component definitions
#[derive(Default)]
pub struct ComponentCatalog {
    definitions: Vec<ComponentDefinition>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: impl Into<ComponentDefinition>) {
        self.definitions.push(definition.into());
    }

    #[must_use]
    pub fn with(mut self, definition: impl Into<ComponentDefinition>) -> Self {
        self.register(definition);
        self
    }

    /// Definitions whose type identifier lives in `package`
    ///
    /// `package` is a module path; `.` is accepted in place of `::`. An
    /// empty package matches every definition.
    pub fn scan(&self, package: &str) -> Vec<&ComponentDefinition> {
        let package = package.trim().replace('.', "::");
        let package = package.trim_matches(':');

        let found: Vec<_> = self
            .definitions
            .iter()
            .filter(|def| in_package(def.type_name(), package))
            .collect();

        if found.is_empty() {
            logger::log_warning(&format!("[Discovery] no components found under `{package}`"));
        } else {
            logger::log_info(&format!(
                "[Discovery] {} component(s) found under `{package}`",
                found.len()
            ));
        }
        found
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn in_package(type_name: &str, package: &str) -> bool {
    if package.is_empty() {
        return true;
    }
    // Generic arguments are not part of the module path
    let path = type_name.split('<').next().unwrap_or(type_name);
    path.strip_prefix(package)
        .is_some_and(|rest| rest.starts_with("::"))
}
