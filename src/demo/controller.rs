use super::service::DemoService;
use crate::container::{Component, DependencySlot, Inject};
use crate::dispatch::Invocation;
use crate::error::OperationError;

/// Handler mounted at `/demo`
pub struct DemoController {
    demo_service: Inject<dyn DemoService>,
}

impl DemoController {
    pub const fn new() -> Self {
        Self {
            demo_service: Inject::new("demo_service"),
        }
    }

    /// `GET /demo/query?name=...`
    ///
    /// Arguments: request, response, `name`.
    pub fn query(&self, inv: &mut Invocation<'_>) -> Result<(), OperationError> {
        let name = inv.required_text(2)?;
        let greeting = self.demo_service.get()?.say_hello(name);
        inv.response().write(&greeting);
        Ok(())
    }
}

impl Default for DemoController {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for DemoController {
    fn dependencies(&self) -> Vec<&dyn DependencySlot> {
        vec![&self.demo_service]
    }
}
