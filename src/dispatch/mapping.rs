//! Handler route metadata and operation invocation
//!
//! A [`HandlerMapping`] is attached to a handler definition at registration
//! time. It carries the handler's base path and one [`RouteDescriptor`] per
//! operation: the sub-path, the positional argument kinds, and the typed
//! callable.

use std::any::Any;
use std::sync::Arc;

use super::request::{WebRequest, WebResponse};
use crate::container::Component;
use crate::error::OperationError;

/// Declared kind of one positional operation argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgKind {
    /// The raw request
    Request,
    /// The response sink
    Response,
    /// Text value bound from the request parameters
    Param(String),
}

impl ArgKind {
    pub fn param(name: impl Into<String>) -> Self {
        Self::Param(name.into())
    }
}

/// Resolved value of one positional argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Request,
    Response,
    Text(Option<String>),
}

type OperationFn =
    dyn Fn(&(dyn Any + Send + Sync), &mut Invocation<'_>) -> Result<(), OperationError> + Send + Sync;

/// Type-erased operation callable
#[derive(Clone)]
pub struct Operation {
    name: String,
    args: Vec<ArgKind>,
    call: Arc<OperationFn>,
}

impl Operation {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[ArgKind] {
        &self.args
    }

    /// Invoke on the owning instance
    pub fn invoke(
        &self,
        target: &(dyn Any + Send + Sync),
        invocation: &mut Invocation<'_>,
    ) -> Result<(), OperationError> {
        (self.call)(target, invocation)
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// One operation of a handler, with optional route metadata
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    path: Option<String>,
    operation: Operation,
}

impl RouteDescriptor {
    /// Routed operation on handler type `C`, mounted at `path`
    pub fn new<C, F>(name: impl Into<String>, path: impl Into<String>, args: Vec<ArgKind>, f: F) -> Self
    where
        C: Component,
        F: Fn(&C, &mut Invocation<'_>) -> Result<(), OperationError> + Send + Sync + 'static,
    {
        Self::build::<C, F>(name.into(), Some(path.into()), args, f)
    }

    /// Operation without route metadata; never entered into the route table
    pub fn unrouted<C, F>(name: impl Into<String>, args: Vec<ArgKind>, f: F) -> Self
    where
        C: Component,
        F: Fn(&C, &mut Invocation<'_>) -> Result<(), OperationError> + Send + Sync + 'static,
    {
        Self::build::<C, F>(name.into(), None, args, f)
    }

    fn build<C, F>(name: String, path: Option<String>, args: Vec<ArgKind>, f: F) -> Self
    where
        C: Component,
        F: Fn(&C, &mut Invocation<'_>) -> Result<(), OperationError> + Send + Sync + 'static,
    {
        let call: Arc<OperationFn> = Arc::new(
            move |target: &(dyn Any + Send + Sync), invocation: &mut Invocation<'_>| {
                let instance = target
                    .downcast_ref::<C>()
                    .ok_or(OperationError::TargetMismatch {
                        expected: std::any::type_name::<C>(),
                    })?;
                f(instance, invocation)
            },
        );
        Self {
            path,
            operation: Operation { name, args, call },
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub const fn operation(&self) -> &Operation {
        &self.operation
    }
}

/// Route metadata of a handler
#[derive(Debug, Clone, Default)]
pub struct HandlerMapping {
    base_path: String,
    routes: Vec<RouteDescriptor>,
}

impl HandlerMapping {
    /// Mapping whose operations are mounted under `base_path`
    pub fn at(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            routes: Vec::new(),
        }
    }

    /// Mapping without a base path
    pub fn root() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn route(mut self, descriptor: RouteDescriptor) -> Self {
        self.routes.push(descriptor);
        self
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }
}

/// Arguments and I/O handed to an operation
pub struct Invocation<'a> {
    request: &'a WebRequest,
    response: &'a mut WebResponse,
    kinds: &'a [ArgKind],
    values: Vec<ArgValue>,
}

impl<'a> Invocation<'a> {
    pub fn new(
        request: &'a WebRequest,
        response: &'a mut WebResponse,
        kinds: &'a [ArgKind],
        values: Vec<ArgValue>,
    ) -> Self {
        Self {
            request,
            response,
            kinds,
            values,
        }
    }

    pub const fn request(&self) -> &WebRequest {
        self.request
    }

    pub fn response(&mut self) -> &mut WebResponse {
        &mut *self.response
    }

    pub fn values(&self) -> &[ArgValue] {
        &self.values
    }

    /// Text argument at `index`; `None` when no value was bound
    pub fn text(&self, index: usize) -> Result<Option<&str>, OperationError> {
        match self.values.get(index) {
            Some(ArgValue::Text(value)) => Ok(value.as_deref()),
            _ => Err(OperationError::ArgumentKind {
                index,
                expected: "text",
            }),
        }
    }

    /// Text argument at `index` that must be present
    pub fn required_text(&self, index: usize) -> Result<&str, OperationError> {
        self.text(index)?.ok_or_else(|| OperationError::MissingParameter {
            name: match self.kinds.get(index) {
                Some(ArgKind::Param(name)) => name.clone(),
                _ => format!("#{index}"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter;

    impl Component for Counter {}

    impl Counter {
        fn echo(&self, inv: &mut Invocation<'_>) -> Result<(), OperationError> {
            let text = inv.required_text(0)?.to_string();
            inv.response().write(&text);
            Ok(())
        }
    }

    #[test]
    fn test_descriptor_invokes_typed_operation() {
        let descriptor =
            RouteDescriptor::new("echo", "echo", vec![ArgKind::param("msg")], Counter::echo);
        assert_eq!(descriptor.path(), Some("echo"));
        assert_eq!(descriptor.operation().name(), "echo");

        let req = WebRequest::get("/echo");
        let mut resp = WebResponse::new();
        let kinds = descriptor.operation().args().to_vec();
        let mut inv = Invocation::new(&req, &mut resp, &kinds, vec![ArgValue::Text(Some("hi".into()))]);
        descriptor.operation().invoke(&Counter, &mut inv).unwrap();
        assert_eq!(resp.body(), "hi");
    }

    #[test]
    fn test_wrong_target_is_reported() {
        let descriptor = RouteDescriptor::unrouted("echo", vec![], Counter::echo);
        assert!(descriptor.path().is_none());

        let req = WebRequest::get("/echo");
        let mut resp = WebResponse::new();
        let mut inv = Invocation::new(&req, &mut resp, &[], vec![]);
        let err = descriptor.operation().invoke(&42_u32, &mut inv).unwrap_err();
        assert!(matches!(err, OperationError::TargetMismatch { .. }));
    }

    #[test]
    fn test_argument_accessors() {
        let req = WebRequest::get("/x");
        let mut resp = WebResponse::new();
        let kinds = [ArgKind::Request, ArgKind::param("name")];
        let inv = Invocation::new(
            &req,
            &mut resp,
            &kinds,
            vec![ArgValue::Request, ArgValue::Text(None)],
        );
        assert!(matches!(inv.text(0), Err(OperationError::ArgumentKind { index: 0, .. })));
        assert_eq!(inv.text(1).unwrap(), None);
        assert!(matches!(
            inv.required_text(1),
            Err(OperationError::MissingParameter { ref name }) if name == "name"
        ));
        assert!(inv.text(5).is_err());
    }
}
