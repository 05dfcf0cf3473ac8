//! Route dispatcher
//!
//! Route table construction from handler mappings, and per-request
//! dispatch to the matching operation.

mod dispatcher;
mod mapping;
mod path;
mod request;
mod table;

pub use dispatcher::{resolve_arguments, Dispatcher, ParamBinding, NOT_FOUND_BODY};
pub use mapping::{ArgKind, ArgValue, HandlerMapping, Invocation, Operation, RouteDescriptor};
pub use path::{compose, normalize, strip_context};
pub use request::{Params, WebRequest, WebResponse, DEFAULT_CONTENT_TYPE};
pub use table::{CollisionPolicy, RouteEntry, RouteTable};
