use trellis_macros::injectable;
use trellis_protocols::{Component, Injectable};

#[derive(Default)]
struct Clock {
    ticks: u64,
}

impl Component for Clock {}

#[injectable(name = "SystemClock")]
impl Clock {
    #[inject]
    fn create() -> Self {
        Self::default()
    }
}

fn main() {
    let class = Clock::component_class();
    assert_eq!(class.name(), "SystemClock");
    assert_eq!(class.signature(), "fn create()");

    let container = trellis_core::Container::new();
    let clock = container
        .resolve_injectable::<Clock>(&trellis_core::Overrides::new())
        .unwrap();
    assert_eq!(clock.ticks, 0);
}
