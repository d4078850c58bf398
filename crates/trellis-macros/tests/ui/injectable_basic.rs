use std::sync::Arc;

use trellis_core::Container;
use trellis_macros::injectable;
use trellis_protocols::{Component, Injectable, Instance};

struct Greeter {
    greeting: Arc<String>,
    punctuation: Instance,
}

impl Component for Greeter {}

#[injectable]
impl Greeter {
    #[inject]
    pub fn new(greeting: Arc<String>, punctuation: Instance) -> Self {
        Self {
            greeting,
            punctuation,
        }
    }

    pub fn greet(&self) -> String {
        let mark = trellis_protocols::downcast::<String>(&self.punctuation)
            .map(|p| p.to_string())
            .unwrap_or_default();
        format!("{}{}", self.greeting, mark)
    }
}

fn main() {
    let class = Greeter::component_class();
    assert_eq!(class.name(), "Greeter");
    assert_eq!(class.signature(), "fn new(greeting, punctuation)");

    let container = Container::new();
    container
        .register_value("greeting", Arc::new("hello".to_string()))
        .unwrap();
    container
        .register_value("punctuation", Arc::new("!".to_string()))
        .unwrap();
    container.register_injectable::<Greeter>("greeter").unwrap();

    let greeter = container.resolve_as::<Greeter>("greeter").unwrap();
    assert_eq!(greeter.greet(), "hello!");
}
