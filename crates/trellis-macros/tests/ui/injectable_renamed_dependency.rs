use std::sync::Arc;

use trellis_core::{Container, Overrides};
use trellis_macros::injectable;
use trellis_protocols::{Component, Injectable};

struct HttpClient {
    proxy: Arc<String>,
    retries: Arc<u32>,
}

impl Component for HttpClient {}

#[injectable]
impl HttpClient {
    #[inject]
    pub fn new(
        #[dep(name = "$proxyUrl")] proxy: Arc<String>,
        #[dep(name = "maxRetries")] retries: Arc<u32>,
    ) -> HttpClient {
        Self { proxy, retries }
    }
}

fn main() {
    assert_eq!(
        HttpClient::component_class().signature(),
        "fn new($proxyUrl, maxRetries)"
    );

    let container = Container::new();
    container
        .register_value("proxyUrl", Arc::new("http://localhost:8888".to_string()))
        .unwrap();
    container.register_value("maxRetries", Arc::new(3u32)).unwrap();

    let overrides = Overrides::new().with("maxRetries", Arc::new(5u32));
    let client = container.resolve_injectable::<HttpClient>(&overrides).unwrap();
    assert_eq!(client.proxy.as_str(), "http://localhost:8888");
    assert_eq!(*client.retries, 5);
}
