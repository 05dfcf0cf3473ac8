//! Dependency wiring engine
//!
//! Walks every registered component, resolves each declared slot against the
//! registry, and binds the result. Must run after the registry is fully
//! populated and before the route table is built.

use super::registry::ComponentRegistry;
use super::slot::BindError;
use crate::error::WiringError;
use crate::logger;

/// How a slot whose key is not registered is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WiringPolicy {
    /// Abort wiring with [`WiringError::Unresolved`]
    #[default]
    Strict,
    /// Log a warning and bind the unresolved marker
    Lenient,
}

/// Summary of a wiring pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WiringReport {
    /// Slots bound to a registered component
    pub bound: usize,
    /// `component.slot -> key` for every slot left unresolved
    pub unresolved: Vec<String>,
}

/// Resolve and bind the dependency slots of every registered component
pub fn wire_all(
    registry: &ComponentRegistry,
    policy: WiringPolicy,
) -> Result<WiringReport, WiringError> {
    let mut report = WiringReport::default();

    for (name, handle) in registry.components() {
        for slot in handle.component().dependencies() {
            let key = match slot.target().map(str::trim) {
                Some(target) if !target.is_empty() => target,
                _ => slot.capability(),
            };
            let resolved = registry.lookup(key);

            if resolved.is_none() {
                if policy == WiringPolicy::Strict {
                    return Err(WiringError::Unresolved {
                        component: name.to_string(),
                        slot: slot.field(),
                        key: key.to_string(),
                    });
                }
                logger::log_warning(&format!(
                    "[Wiring] `{name}.{}` left unresolved: nothing registered as `{key}`",
                    slot.field()
                ));
                report.unresolved.push(format!("{name}.{} -> {key}", slot.field()));
            }

            slot.bind(resolved).map_err(|err| match err {
                BindError::TypeMismatch { found, expected } => WiringError::TypeMismatch {
                    component: name.to_string(),
                    slot: slot.field(),
                    key: key.to_string(),
                    found,
                    expected,
                },
                BindError::Rebound => WiringError::Rebound {
                    component: name.to_string(),
                    slot: slot.field(),
                },
            })?;

            if resolved.is_some() {
                report.bound += 1;
                logger::log_debug(&format!("[Wiring] `{name}.{}` <- `{key}`", slot.field()));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Component, ComponentDefinition, DependencySlot, Inject};

    trait Repository: Send + Sync {
        fn find(&self) -> &'static str;
    }

    struct UserRepository;

    impl Repository for UserRepository {
        fn find(&self) -> &'static str {
            "ada"
        }
    }

    impl Component for UserRepository {}

    struct UserService {
        repository: Inject<dyn Repository>,
    }

    impl Component for UserService {
        fn dependencies(&self) -> Vec<&dyn DependencySlot> {
            vec![&self.repository]
        }
    }

    struct AuditService {
        users: Inject<UserService>,
    }

    impl Component for AuditService {
        fn dependencies(&self) -> Vec<&dyn DependencySlot> {
            vec![&self.users]
        }
    }

    fn populate(defs: &[ComponentDefinition]) -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.populate(defs).unwrap();
        registry
    }

    fn repository_def() -> ComponentDefinition {
        ComponentDefinition::service(|| Ok(UserRepository))
            .provides::<dyn Repository>(|c| c)
            .build()
    }

    fn service_def() -> ComponentDefinition {
        ComponentDefinition::service(|| {
            Ok(UserService {
                repository: Inject::new("repository"),
            })
        })
        .build()
    }

    #[test]
    fn test_wires_by_capability_regardless_of_order() {
        // dependent registered before its dependency
        let registry = populate(&[service_def(), repository_def()]);
        let report = wire_all(&registry, WiringPolicy::Strict).unwrap();
        assert_eq!(report.bound, 1);

        let service = registry.lookup("userService").unwrap().downcast::<UserService>().unwrap();
        assert_eq!(service.repository.get().unwrap().find(), "ada");
    }

    #[test]
    fn test_wires_by_explicit_name() {
        let audit = ComponentDefinition::service(|| {
            Ok(AuditService {
                users: Inject::named("users", " userService "),
            })
        })
        .build();
        let registry = populate(&[repository_def(), service_def(), audit]);
        wire_all(&registry, WiringPolicy::Strict).unwrap();

        let audit = registry.lookup("auditService").unwrap().downcast::<AuditService>().unwrap();
        let users = audit.users.get().unwrap();
        assert_eq!(users.repository.get().unwrap().find(), "ada");
    }

    #[test]
    fn test_strict_policy_names_missing_dependency() {
        let registry = populate(&[service_def()]);
        let err = wire_all(&registry, WiringPolicy::Strict).unwrap_err();
        match err {
            WiringError::Unresolved { component, slot, key } => {
                assert_eq!(component, "userService");
                assert_eq!(slot, "repository");
                assert!(key.ends_with("Repository"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_lenient_policy_leaves_unresolved_marker() {
        let registry = populate(&[service_def()]);
        let report = wire_all(&registry, WiringPolicy::Lenient).unwrap();
        assert_eq!(report.bound, 0);
        assert_eq!(report.unresolved.len(), 1);

        let service = registry.lookup("userService").unwrap().downcast::<UserService>().unwrap();
        assert!(service.repository.is_wired());
        assert!(service.repository.get().is_err());
    }

    #[test]
    fn test_wiring_is_idempotent() {
        let registry = populate(&[repository_def(), service_def()]);
        let first = wire_all(&registry, WiringPolicy::Strict).unwrap();
        let service = registry.lookup("userService").unwrap().downcast::<UserService>().unwrap();
        let before = service.repository.shared().unwrap();

        let second = wire_all(&registry, WiringPolicy::Strict).unwrap();
        let after = service.repository.shared().unwrap();
        assert_eq!(first, second);
        assert!(std::ptr::addr_eq(std::sync::Arc::as_ptr(&before), std::sync::Arc::as_ptr(&after)));
    }

    trait Reporting: Send + Sync {}

    impl Reporting for UserService {}

    fn shadowed_defs() -> [ComponentDefinition; 2] {
        let needy = ComponentDefinition::service(|| {
            Ok(UserService {
                repository: Inject::new("repository"),
            })
        })
        .named("svc")
        .provides::<dyn Reporting>(|c| c)
        .build();
        let replacement = ComponentDefinition::service(|| Ok(UserRepository))
            .named("svc")
            .build();
        [needy, replacement]
    }

    #[test]
    fn test_wires_instance_whose_name_was_taken_over() {
        let [needy, replacement] = shadowed_defs();
        let registry = populate(&[repository_def(), needy, replacement]);
        let report = wire_all(&registry, WiringPolicy::Strict).unwrap();
        assert_eq!(report.bound, 1);

        let key = crate::container::capability_id::<dyn Reporting>();
        let service = registry.lookup(key).unwrap().downcast::<UserService>().unwrap();
        assert!(service.repository.is_resolved());
        assert_eq!(service.repository.get().unwrap().find(), "ada");
    }

    #[test]
    fn test_strict_policy_checks_instance_whose_name_was_taken_over() {
        let [needy, replacement] = shadowed_defs();
        let registry = populate(&[needy, replacement]);
        let err = wire_all(&registry, WiringPolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            WiringError::Unresolved { ref component, slot: "repository", .. } if component == "svc"
        ));
    }

    #[test]
    fn test_type_mismatch_is_fatal() {
        let audit = ComponentDefinition::service(|| {
            Ok(AuditService {
                users: Inject::named("users", "userRepository"),
            })
        })
        .build();
        let registry = populate(&[repository_def(), audit]);
        let err = wire_all(&registry, WiringPolicy::Lenient).unwrap_err();
        assert!(matches!(err, WiringError::TypeMismatch { slot: "users", .. }));
    }
}
