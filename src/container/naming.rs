//! Registry key derivation

/// Registry key of a capability (interface) type
///
/// Components advertise capabilities as trait-object types, so a slot of type
/// `Inject<dyn Greeter>` and the alias registered by `provides::<dyn Greeter>`
/// agree on the same key.
pub fn capability_id<T: ?Sized>() -> &'static str {
    std::any::type_name::<T>()
}

/// Last path segment of a type identifier, without generic arguments
pub fn simple_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}

/// Default registry name: simple type name with its first letter lower-cased
///
/// Uses Unicode lower-casing, so names that already start lower-case or with a
/// non-ASCII letter are handled correctly.
pub fn default_name(type_name: &str) -> String {
    let simple = simple_name(type_name);
    let mut chars = simple.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
