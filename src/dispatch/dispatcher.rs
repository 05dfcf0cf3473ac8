//! Request dispatcher
//!
//! Stateless per request: resolves the path, binds arguments, locates the
//! owning handler in the registry and invokes the operation.

use std::sync::Arc;

use serde::Deserialize;

use super::mapping::{ArgKind, ArgValue, Invocation};
use super::path::{normalize, strip_context};
use super::request::{Params, WebRequest, WebResponse};
use super::table::{RouteEntry, RouteTable};
use crate::container::ComponentRegistry;
use crate::error::DispatchError;

pub const NOT_FOUND_BODY: &str = "404 Not Found";

/// How text arguments are bound from request parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamBinding {
    /// Each slot takes the parameter with its declared name
    #[default]
    ByName,
    /// Every slot takes the last parameter of the request, names ignored
    LastEntry,
}

/// Routes requests against a frozen registry and route table
pub struct Dispatcher {
    registry: Arc<ComponentRegistry>,
    routes: Arc<RouteTable>,
    context_path: String,
    binding: ParamBinding,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ComponentRegistry>,
        routes: Arc<RouteTable>,
        context_path: impl Into<String>,
        binding: ParamBinding,
    ) -> Self {
        Self {
            registry,
            routes,
            context_path: normalize(&context_path.into()),
            binding,
        }
    }

    /// Lookup key for a raw request path; `None` outside the context path
    pub fn route_path(&self, raw: &str) -> Option<String> {
        strip_context(raw, &self.context_path).map(normalize)
    }

    /// Route entry that would serve `request`, if any
    pub fn resolve(&self, request: &WebRequest) -> Option<&RouteEntry> {
        self.routes.get(&self.route_path(request.path())?)
    }

    /// Dispatch one request
    ///
    /// A route miss writes a 404 and is not an error. Argument and
    /// invocation faults are returned to the caller.
    pub fn dispatch(
        &self,
        request: &WebRequest,
        response: &mut WebResponse,
    ) -> Result<(), DispatchError> {
        let path = self.route_path(request.path());
        let Some((path, entry)) = path.and_then(|p| self.routes.get(&p).map(|e| (p, e))) else {
            response.set_status(404);
            response.write(NOT_FOUND_BODY);
            return Ok(());
        };

        let owner = self
            .registry
            .lookup(&entry.component)
            .ok_or_else(|| DispatchError::MissingHandler {
                component: entry.component.clone(),
                path: path.clone(),
            })?;

        let kinds = entry.operation.args();
        let values = resolve_arguments(kinds, request.params(), self.binding);
        let mut invocation = Invocation::new(request, response, kinds, values);
        entry
            .operation
            .invoke(owner.object(), &mut invocation)
            .map_err(|source| DispatchError::Operation {
                path,
                operation: entry.operation.name().to_string(),
                source,
            })
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub const fn binding(&self) -> ParamBinding {
        self.binding
    }
}

/// Positional argument values for `kinds`
pub fn resolve_arguments(kinds: &[ArgKind], params: &Params, binding: ParamBinding) -> Vec<ArgValue> {
    kinds
        .iter()
        .map(|kind| match kind {
            ArgKind::Request => ArgValue::Request,
            ArgKind::Response => ArgValue::Response,
            ArgKind::Param(name) => ArgValue::Text(match binding {
                ParamBinding::ByName => params.joined(name),
                ParamBinding::LastEntry => params.last().map(|(_, values)| values.join(",")),
            }),
        })
        .collect()
}
