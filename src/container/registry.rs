//! Component registry
//!
//! Maps names and capability identifiers to shared component instances.
//! Registration order is kept so that wiring and route construction are
//! deterministic. Once the application has started, the registry is only
//! reachable through `Arc<ComponentRegistry>` and offers no mutation.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use super::definition::{Component, ComponentDefinition, Role, SharedAny};
use crate::dispatch::HandlerMapping;
use crate::error::StartupError;
use crate::logger;

/// A registered instance with its views and metadata
pub struct ComponentInstance {
    pub(super) name: String,
    pub(super) type_name: &'static str,
    pub(super) role: Role,
    pub(super) object: SharedAny,
    pub(super) component: Arc<dyn Component>,
    pub(super) views: HashMap<TypeId, SharedAny>,
    pub(super) mapping: Option<Arc<HandlerMapping>>,
}

/// Cheap, clonable reference to a registered instance
#[derive(Clone)]
pub struct ComponentHandle(Arc<ComponentInstance>);

impl ComponentHandle {
    pub(super) fn new(instance: ComponentInstance) -> Self {
        Self(Arc::new(instance))
    }

    /// Name assigned at instantiation (explicit or derived)
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn type_name(&self) -> &'static str {
        self.0.type_name
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    /// The instance as `&dyn Any`, for operations that downcast it
    pub fn object(&self) -> &(dyn Any + Send + Sync) {
        self.0.object.as_ref()
    }

    pub fn component(&self) -> &dyn Component {
        self.0.component.as_ref()
    }

    pub fn mapping(&self) -> Option<&HandlerMapping> {
        self.0.mapping.as_deref()
    }

    /// Concrete instance, if it is a `C`
    pub fn downcast<C: Component>(&self) -> Option<Arc<C>> {
        Arc::clone(&self.0.object).downcast::<C>().ok()
    }

    /// View of the instance as `T`: its own type or a declared capability
    pub fn view<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.0
            .views
            .get(&TypeId::of::<T>())?
            .downcast_ref::<Arc<T>>()
            .cloned()
    }

    /// Whether two handles refer to the same instance
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("name", &self.0.name)
            .field("type_name", &self.0.type_name)
            .field("role", &self.0.role)
            .finish_non_exhaustive()
    }
}

/// Name- and capability-keyed store of component instances
#[derive(Default)]
pub struct ComponentRegistry {
    entries: HashMap<String, ComponentHandle>,
    /// Distinct instances in first-registration order, under any key
    instances: Vec<ComponentHandle>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `instance` under `name`, replacing any previous entry
    pub fn register(&mut self, name: impl Into<String>, instance: ComponentHandle) {
        let name = name.into();
        self.track(&instance);
        if let Some(previous) = self.entries.insert(name.clone(), instance) {
            logger::log_debug(&format!(
                "[Registry] `{name}` replaced (was {})",
                previous.type_name()
            ));
        }
    }

    /// Store `instance` under an additional capability key
    pub fn register_alias(&mut self, capability_id: impl Into<String>, instance: ComponentHandle) {
        let key = capability_id.into();
        self.track(&instance);
        if let Some(previous) = self.entries.insert(key.clone(), instance) {
            logger::log_debug(&format!(
                "[Registry] alias `{key}` replaced (was {})",
                previous.name()
            ));
        }
    }

    fn track(&mut self, instance: &ComponentHandle) {
        if !self.instances.iter().any(|h| h.same_instance(instance)) {
            self.instances.push(instance.clone());
        }
    }

    /// Instance registered under `name` or a capability key
    pub fn lookup(&self, name: &str) -> Option<&ComponentHandle> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of keys (names and aliases)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unique instances still reachable under any key, in registration order
    ///
    /// Each item carries the instance's own registry name. An instance whose
    /// name was taken over by a later registration is still listed while a
    /// capability alias points to it.
    pub fn components(&self) -> Vec<(&str, &ComponentHandle)> {
        self.instances
            .iter()
            .filter(|handle| self.entries.values().any(|h| h.same_instance(handle)))
            .map(|handle| (handle.name(), handle))
            .collect()
    }

    /// Whether `handle` is the instance currently registered under its own name
    pub fn is_primary(&self, handle: &ComponentHandle) -> bool {
        self.lookup(handle.name())
            .is_some_and(|current| current.same_instance(handle))
    }

    /// Instantiate every definition and register it by name and capabilities
    ///
    /// Stops at the first factory failure; nothing after it is registered.
    pub fn populate<'a, I>(&mut self, definitions: I) -> Result<usize, StartupError>
    where
        I: IntoIterator<Item = &'a ComponentDefinition>,
    {
        let mut count = 0;
        for definition in definitions {
            let handle = definition.instantiate()?;
            let name = handle.name().to_string();
            for capability in definition.capability_ids() {
                self.register_alias(capability, handle.clone());
            }
            logger::log_debug(&format!(
                "[Registry] {:?} `{name}` -> {}",
                definition.role(),
                definition.type_name()
            ));
            self.register(name, handle);
            count += 1;
        }
        Ok(count)
    }
}
