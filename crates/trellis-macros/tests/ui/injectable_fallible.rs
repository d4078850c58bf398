use std::path::PathBuf;
use std::sync::Arc;

use trellis_core::Container;
use trellis_macros::injectable;
use trellis_protocols::{Component, ComponentError, ContainerError};

struct Workspace {
    root: Arc<PathBuf>,
}

impl Component for Workspace {}

#[injectable]
impl Workspace {
    #[inject]
    fn open(root: Arc<PathBuf>) -> Result<Self, ComponentError> {
        if root.as_os_str().is_empty() {
            return Err(ComponentError::InitializationFailed("empty root".to_string()));
        }
        Ok(Self { root })
    }
}

fn main() {
    let container = Container::new();
    container.register_value("root", Arc::new(PathBuf::new())).unwrap();
    container.register_injectable::<Workspace>("workspace").unwrap();

    match container.resolve("workspace") {
        Err(ContainerError::Construction { component, .. }) => assert_eq!(component, "Workspace"),
        _ => panic!("expected a construction error"),
    }

    let container = Container::new();
    container
        .register_value("root", Arc::new(PathBuf::from("/tmp")))
        .unwrap();
    container.register_injectable::<Workspace>("workspace").unwrap();
    let workspace = container.resolve_as::<Workspace>("workspace").unwrap();
    assert_eq!(workspace.root.as_path(), std::path::Path::new("/tmp"));
}
