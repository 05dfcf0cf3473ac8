use crate::container::Component;

/// Greeting capability
pub trait DemoService: Send + Sync {
    fn say_hello(&self, name: &str) -> String;
}

pub struct DemoServiceImpl;

impl Component for DemoServiceImpl {}

impl DemoService for DemoServiceImpl {
    fn say_hello(&self, name: &str) -> String {
        format!("Hello, {name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_say_hello() {
        assert_eq!(DemoServiceImpl.say_hello("Ada"), "Hello, Ada");
        assert_eq!(DemoServiceImpl.say_hello(""), "Hello, ");
    }
}
