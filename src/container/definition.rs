//! Component definitions
//!
//! A definition is the declarative description of a component handed over by
//! discovery: role, type identifier, optional explicit name, the capabilities
//! it satisfies, a factory, and (for handlers) its route mapping.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use super::naming::{capability_id, default_name};
use super::registry::{ComponentHandle, ComponentInstance};
use super::slot::DependencySlot;
use crate::dispatch::HandlerMapping;
use crate::error::{BoxError, StartupError};

/// Erased shared instance
pub type SharedAny = Arc<dyn Any + Send + Sync>;

type Factory = Box<dyn Fn() -> Result<Instantiated, BoxError> + Send + Sync>;
type ViewFn = Box<dyn Fn(&SharedAny) -> Option<SharedAny> + Send + Sync>;

/// Declared role of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Exposes routed operations
    Handler,
    /// Exposes only injectable capability
    Service,
}

/// Behaviour every registrable component provides
pub trait Component: Send + Sync + 'static {
    /// Dependency slots to be filled by the wiring engine
    fn dependencies(&self) -> Vec<&dyn DependencySlot> {
        Vec::new()
    }
}

struct Instantiated {
    object: SharedAny,
    component: Arc<dyn Component>,
    own_view: (TypeId, SharedAny),
}

struct Capability {
    id: &'static str,
    type_id: TypeId,
    view: ViewFn,
}

/// Description of one discoverable component
pub struct ComponentDefinition {
    type_name: &'static str,
    role: Role,
    name: Option<String>,
    capabilities: Vec<Capability>,
    mapping: Option<Arc<HandlerMapping>>,
    factory: Factory,
}

impl ComponentDefinition {
    /// Start a handler definition
    pub fn handler<C, F>(factory: F) -> DefinitionBuilder<C>
    where
        C: Component,
        F: Fn() -> Result<C, BoxError> + Send + Sync + 'static,
    {
        DefinitionBuilder::new(Role::Handler, factory)
    }

    /// Start a service definition
    pub fn service<C, F>(factory: F) -> DefinitionBuilder<C>
    where
        C: Component,
        F: Fn() -> Result<C, BoxError> + Send + Sync + 'static,
    {
        DefinitionBuilder::new(Role::Service, factory)
    }

    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    pub fn explicit_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Registry name: the explicit name when non-empty, otherwise derived
    pub fn registry_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default_name(self.type_name),
        }
    }

    /// Capability identifiers this component satisfies, in declaration order
    pub fn capability_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.capabilities.iter().map(|c| c.id)
    }

    /// Build the instance through the factory
    pub fn instantiate(&self) -> Result<ComponentHandle, StartupError> {
        let name = self.registry_name();
        let built = (self.factory)().map_err(|source| StartupError::Instantiation {
            component: name.clone(),
            source,
        })?;

        let mut views = HashMap::with_capacity(self.capabilities.len() + 1);
        views.insert(built.own_view.0, built.own_view.1);
        for capability in &self.capabilities {
            if let Some(view) = (capability.view)(&built.object) {
                views.insert(capability.type_id, view);
            }
        }

        Ok(ComponentHandle::new(ComponentInstance {
            name,
            type_name: self.type_name,
            role: self.role,
            object: built.object,
            component: built.component,
            views,
            mapping: self.mapping.clone(),
        }))
    }
}

/// Typed builder for a [`ComponentDefinition`]
pub struct DefinitionBuilder<C> {
    definition: ComponentDefinition,
    _component: PhantomData<fn() -> C>,
}

impl<C: Component> DefinitionBuilder<C> {
    fn new<F>(role: Role, factory: F) -> Self
    where
        F: Fn() -> Result<C, BoxError> + Send + Sync + 'static,
    {
        let factory: Factory = Box::new(move || {
            let instance = Arc::new(factory()?);
            let component: Arc<dyn Component> = instance.clone();
            let own_view: SharedAny = Arc::new(Arc::clone(&instance));
            Ok(Instantiated {
                object: instance,
                component,
                own_view: (TypeId::of::<C>(), own_view),
            })
        });

        Self {
            definition: ComponentDefinition {
                type_name: std::any::type_name::<C>(),
                role,
                name: None,
                capabilities: Vec::new(),
                mapping: None,
                factory,
            },
            _component: PhantomData,
        }
    }

    /// Register under an explicit name instead of the derived one
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.definition.name = Some(name.into());
        self
    }

    /// Declare that the component satisfies capability `I`
    ///
    /// `cast` is usually the identity closure `|c| c`, which coerces the
    /// concrete `Arc<C>` into `Arc<dyn Trait>`.
    #[must_use]
    pub fn provides<I>(mut self, cast: fn(Arc<C>) -> Arc<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let view: ViewFn = Box::new(move |object| {
            let concrete = Arc::clone(object).downcast::<C>().ok()?;
            let view: SharedAny = Arc::new(cast(concrete));
            Some(view)
        });
        self.definition.capabilities.push(Capability {
            id: capability_id::<I>(),
            type_id: TypeId::of::<I>(),
            view,
        });
        self
    }

    /// Attach the route mapping of a handler
    #[must_use]
    pub fn mapping(mut self, mapping: HandlerMapping) -> Self {
        self.definition.mapping = Some(Arc::new(mapping));
        self
    }

    pub fn build(self) -> ComponentDefinition {
        self.definition
    }
}

impl<C: Component> From<DefinitionBuilder<C>> for ComponentDefinition {
    fn from(builder: DefinitionBuilder<C>) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    impl Component for English {}

    #[test]
    fn test_registry_name_derivation() {
        let def = ComponentDefinition::service(|| Ok(English)).build();
        assert_eq!(def.registry_name(), "english");
        assert_eq!(def.role(), Role::Service);

        let def = ComponentDefinition::service(|| Ok(English)).named("en").build();
        assert_eq!(def.registry_name(), "en");

        let def = ComponentDefinition::service(|| Ok(English)).named("  ").build();
        assert_eq!(def.registry_name(), "english");
    }

    #[test]
    fn test_instantiate_exposes_views() {
        let def = ComponentDefinition::service(|| Ok(English))
            .provides::<dyn Greeter>(|c| c)
            .build();
        assert_eq!(def.capability_ids().count(), 1);

        let handle = def.instantiate().unwrap();
        assert_eq!(handle.name(), "english");
        assert_eq!(handle.view::<dyn Greeter>().unwrap().greet(), "hello");
        assert!(handle.downcast::<English>().is_some());
    }

    #[test]
    fn test_instantiation_failure_names_component() {
        let def = ComponentDefinition::service(|| -> Result<English, BoxError> {
            Err("no locale".into())
        })
        .build();
        let err = def.instantiate().err().unwrap();
        assert!(matches!(
            err,
            StartupError::Instantiation { ref component, .. } if component == "english"
        ));
    }
}
