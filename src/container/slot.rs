//! Dependency slots
//!
//! A slot is a write-once cell on a component, bound by the wiring engine
//! through a shared reference. Components list their slots from
//! [`Component::dependencies`](super::Component::dependencies).

use std::sync::{Arc, OnceLock};

use super::naming::capability_id;
use super::registry::ComponentHandle;
use crate::error::OperationError;

/// Why a slot refused a binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The resolved component does not provide the slot's type
    TypeMismatch {
        found: &'static str,
        expected: &'static str,
    },
    /// The slot already holds a different reference
    Rebound,
}

/// Type-erased view of an [`Inject`] slot, as seen by the wiring engine
pub trait DependencySlot: Send + Sync {
    /// Field name, used in diagnostics
    fn field(&self) -> &'static str;

    /// Explicit registry name to resolve, if any
    fn target(&self) -> Option<&str>;

    /// Capability identifier used when no target name is given
    fn capability(&self) -> &'static str;

    /// Bind the resolved component, or the unresolved marker for `None`
    fn bind(&self, resolved: Option<&ComponentHandle>) -> Result<(), BindError>;

    /// Whether the slot holds a reference (not the unresolved marker)
    fn is_resolved(&self) -> bool;
}

/// Injectable dependency of type `T` (a concrete type or a `dyn` capability)
pub struct Inject<T: ?Sized + 'static> {
    field: &'static str,
    target: Option<String>,
    cell: OnceLock<Option<Arc<T>>>,
}

impl<T: ?Sized + Send + Sync + 'static> Inject<T> {
    /// Slot resolved by its type's capability identifier
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            target: None,
            cell: OnceLock::new(),
        }
    }

    /// Slot resolved by an explicit registry name
    pub fn named(field: &'static str, target: impl Into<String>) -> Self {
        Self {
            field,
            target: Some(target.into()),
            cell: OnceLock::new(),
        }
    }

    /// Borrow the bound dependency
    pub fn get(&self) -> Result<&T, OperationError> {
        match self.cell.get() {
            Some(Some(value)) => Ok(value.as_ref()),
            _ => Err(OperationError::Unresolved {
                slot: self.field,
                capability: capability_id::<T>(),
            }),
        }
    }

    /// Clone the bound reference, if any
    pub fn shared(&self) -> Option<Arc<T>> {
        self.cell.get().and_then(Clone::clone)
    }

    /// Whether the wiring engine has visited this slot
    pub fn is_wired(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: ?Sized + Send + Sync + 'static> DependencySlot for Inject<T> {
    fn field(&self) -> &'static str {
        self.field
    }

    fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    fn capability(&self) -> &'static str {
        capability_id::<T>()
    }

    fn bind(&self, resolved: Option<&ComponentHandle>) -> Result<(), BindError> {
        let value = match resolved {
            Some(handle) => Some(handle.view::<T>().ok_or(BindError::TypeMismatch {
                found: handle.type_name(),
                expected: capability_id::<T>(),
            })?),
            None => None,
        };

        match self.cell.set(value) {
            Ok(()) => Ok(()),
            Err(value) => {
                let current = self.cell.get().ok_or(BindError::Rebound)?;
                if same_reference(current.as_ref(), value.as_ref()) {
                    Ok(())
                } else {
                    Err(BindError::Rebound)
                }
            }
        }
    }

    fn is_resolved(&self) -> bool {
        matches!(self.cell.get(), Some(Some(_)))
    }
}

/// Pointer identity, ignoring trait-object metadata
fn same_reference<T: ?Sized>(a: Option<&Arc<T>>, b: Option<&Arc<T>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Component, ComponentDefinition};

    trait Clock: Send + Sync {
        fn now(&self) -> u64;
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> u64 {
            42
        }
    }

    impl Component for FixedClock {}

    struct Unrelated;

    impl Component for Unrelated {}

    fn clock_handle() -> ComponentHandle {
        ComponentDefinition::service(|| Ok(FixedClock))
            .provides::<dyn Clock>(|c| c)
            .build()
            .instantiate()
            .unwrap()
    }

    #[test]
    fn test_unbound_slot_reports_unresolved() {
        let slot: Inject<dyn Clock> = Inject::new("clock");
        assert!(!slot.is_wired());
        let err = slot.get().err().unwrap();
        assert!(matches!(err, OperationError::Unresolved { slot: "clock", .. }));
    }

    #[test]
    fn test_bind_capability_view() {
        let slot: Inject<dyn Clock> = Inject::new("clock");
        let handle = clock_handle();
        slot.bind(Some(&handle)).unwrap();
        assert!(slot.is_resolved());
        assert_eq!(slot.get().unwrap().now(), 42);
    }

    #[test]
    fn test_bind_concrete_view() {
        let slot: Inject<FixedClock> = Inject::named("clock", "fixedClock");
        assert_eq!(slot.target(), Some("fixedClock"));
        slot.bind(Some(&clock_handle())).unwrap();
        assert_eq!(slot.get().unwrap().now(), 42);
    }

    #[test]
    fn test_rebinding_same_instance_is_idempotent() {
        let slot: Inject<dyn Clock> = Inject::new("clock");
        let handle = clock_handle();
        slot.bind(Some(&handle)).unwrap();
        slot.bind(Some(&handle)).unwrap();

        let other = clock_handle();
        assert_eq!(slot.bind(Some(&other)), Err(BindError::Rebound));
    }

    #[test]
    fn test_unresolved_marker() {
        let slot: Inject<dyn Clock> = Inject::new("clock");
        slot.bind(None).unwrap();
        assert!(slot.is_wired());
        assert!(!slot.is_resolved());
        assert!(slot.get().is_err());
        slot.bind(None).unwrap();
    }

    #[test]
    fn test_type_mismatch() {
        let slot: Inject<dyn Clock> = Inject::new("clock");
        let handle = ComponentDefinition::service(|| Ok(Unrelated))
            .build()
            .instantiate()
            .unwrap();
        let err = slot.bind(Some(&handle)).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
        assert!(!slot.is_wired());
    }
}
