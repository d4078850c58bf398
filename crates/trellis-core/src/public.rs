//! The public api.
//!
//! Names exposed with [`Container::require_public`] or
//! [`Container::require_public_class`] are resolved lazily: the first read
//! loads the module, resolves the component and caches the result. Later
//! reads return the cached value.

use futures::future::BoxFuture;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use trellis_protocols::{
    downcast, Component, ComponentError, ContainerError, ExportedMethod, Initialization, Instance,
};

use crate::container::Container;
use crate::reflect::strip_marker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PublicKind {
    Component,
    Class,
}

/// A lazily resolved public name.
pub(crate) struct PublicEntry {
    name: String,
    path: String,
    kind: PublicKind,
    value: OnceCell<PublicValue>,
}

impl PublicEntry {
    fn new(name: &str, path: &str, kind: PublicKind) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            kind,
            value: OnceCell::new(),
        }
    }
}

/// Value read from the public api.
#[derive(Clone)]
pub enum PublicValue {
    /// The resolved component itself.
    Component(Instance),
    /// Only the exported methods of the resolved component.
    Class(Arc<PublicClass>),
}

impl PublicValue {
    pub fn as_component(&self) -> Option<&Instance> {
        match self {
            PublicValue::Component(instance) => Some(instance),
            PublicValue::Class(_) => None,
        }
    }

    pub fn as_class(&self) -> Option<&Arc<PublicClass>> {
        match self {
            PublicValue::Class(class) => Some(class),
            PublicValue::Component(_) => None,
        }
    }
}

impl fmt::Debug for PublicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicValue::Component(instance) => f
                .debug_tuple("Component")
                .field(&(**instance).type_name())
                .finish(),
            PublicValue::Class(class) => f.debug_tuple("Class").field(class).finish(),
        }
    }
}

/// A component reduced to the methods it exports.
pub struct PublicClass {
    name: String,
    instance: Instance,
    methods: BTreeMap<String, ExportedMethod>,
}

impl PublicClass {
    fn new(name: &str, instance: Instance) -> Self {
        let methods = instance
            .exports()
            .into_iter()
            .map(|method| (method.name().to_string(), method))
            .collect();
        Self {
            name: name.to_string(),
            instance,
            methods,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exported method names, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Call an exported method.
    pub async fn call(&self, method: &str, args: Value) -> Result<Value, ComponentError> {
        let Some(export) = self.methods.get(method) else {
            return Err(ComponentError::Custom(format!(
                "{} has no exported method {}",
                self.name, method
            )));
        };
        export.call(self.instance.clone(), args).await
    }
}

impl fmt::Debug for PublicClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicClass")
            .field("name", &self.name)
            .field("methods", &self.method_names())
            .finish()
    }
}

/// Read access to the public api of a container.
#[derive(Clone, Copy)]
pub struct PublicApi<'a> {
    container: &'a Container,
}

impl PublicApi<'_> {
    /// Public names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .container
            .public
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.container.public.contains_key(strip_marker(name))
    }

    /// Whether `name` was already read once.
    pub fn is_resolved(&self, name: &str) -> bool {
        self.container
            .public
            .get(strip_marker(name))
            .map(|entry| entry.value.get().is_some())
            .unwrap_or(false)
    }

    /// Read `name`, resolving it on first access.
    pub fn get(&self, name: &str) -> Result<PublicValue, ContainerError> {
        let name = strip_marker(name);
        let entry = self
            .container
            .public
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ContainerError::NotPublic(name.to_string()))?;

        entry
            .value
            .get_or_try_init(|| self.container.fire_public(&entry))
            .cloned()
    }

    /// Read a component exposed with `require_public` as `T`.
    pub fn component<T: Component>(&self, name: &str) -> Result<Arc<T>, ContainerError> {
        let expected = || ContainerError::DependencyType {
            name: strip_marker(name).to_string(),
            expected: std::any::type_name::<T>(),
        };
        match self.get(name)? {
            PublicValue::Component(instance) => downcast::<T>(&instance).ok_or_else(expected),
            PublicValue::Class(_) => Err(expected()),
        }
    }

    /// Read a class exposed with `require_public_class`.
    pub fn class(&self, name: &str) -> Result<Arc<PublicClass>, ContainerError> {
        match self.get(name)? {
            PublicValue::Class(class) => Ok(class),
            PublicValue::Component(_) => Err(ContainerError::DependencyType {
                name: strip_marker(name).to_string(),
                expected: "PublicClass",
            }),
        }
    }
}

impl Container {
    /// Expose `name` on the public api, loaded from `path` on first read.
    pub fn require_public(&self, name: &str, path: &str) -> Result<(), ContainerError> {
        self.add_public(name, path, PublicKind::Component)
    }

    /// Expose the exported methods of `name` on the public api.
    ///
    /// On first read the component's initialize hook runs once. A deferred
    /// initialization is spawned and not awaited.
    pub fn require_public_class(&self, name: &str, path: &str) -> Result<(), ContainerError> {
        self.add_public(name, path, PublicKind::Class)
    }

    pub fn public_api(&self) -> PublicApi<'_> {
        PublicApi { container: self }
    }

    fn add_public(&self, name: &str, path: &str, kind: PublicKind) -> Result<(), ContainerError> {
        let name = strip_marker(name);
        self.require(name, path)?;

        let unchanged = self
            .public
            .get(name)
            .map(|entry| entry.path == path && entry.kind == kind)
            .unwrap_or(false);
        if !unchanged {
            self.public
                .insert(name.to_string(), Arc::new(PublicEntry::new(name, path, kind)));
            debug!(name, path, "Exposed public name");
        }
        Ok(())
    }

    /// Point the public entry for `name`, if any, at `path` and drop its
    /// cached value.
    pub(crate) fn rebind_public(&self, name: &str, path: &str) {
        let Some(kind) = self.public.get(name).map(|entry| entry.kind) else {
            return;
        };
        self.public
            .insert(name.to_string(), Arc::new(PublicEntry::new(name, path, kind)));
        debug!(name, path, "Reset public name");
    }

    fn fire_public(&self, entry: &PublicEntry) -> Result<PublicValue, ContainerError> {
        let instance = self.resolve(&entry.name)?;
        match entry.kind {
            PublicKind::Component => Ok(PublicValue::Component(instance)),
            PublicKind::Class => {
                start_initialize(&entry.name, &instance);
                Ok(PublicValue::Class(Arc::new(PublicClass::new(
                    &entry.name,
                    instance,
                ))))
            }
        }
    }
}

fn start_initialize(name: &str, instance: &Instance) {
    match instance.clone().initialize() {
        None => {}
        Some(Initialization::Completed(Ok(()))) => debug!(component = name, "Initialized"),
        Some(Initialization::Completed(Err(e))) => {
            warn!("Failed to initialize {}: {}", name, e);
        }
        Some(Initialization::Deferred(future)) => spawn_detached(name.to_string(), future),
    }
}

/// Run a deferred initialization without waiting for it.
fn spawn_detached(name: String, future: BoxFuture<'static, Result<(), ComponentError>>) {
    let label = name.clone();
    let task = async move {
        match future.await {
            Ok(()) => debug!(component = %name, "Initialized"),
            Err(e) => warn!("Failed to initialize {}: {}", name, e),
        }
    };

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(task);
        }
        Err(_) => {
            let spawned = std::thread::Builder::new()
                .name(format!("init-{}", label))
                .spawn(move || futures::executor::block_on(task));
            if let Err(e) = spawned {
                warn!("Failed to start initialization of {}: {}", label, e);
            }
        }
    }
}
