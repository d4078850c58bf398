//! Registration records and resolution state.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use trellis_protocols::{Component, ComponentClass, ContainerError, Injectable, Instance};

use crate::reflect::strip_marker;

/// Zero-argument factory producing a component.
pub type FactoryFn = Arc<dyn Fn() -> Result<Instance, ContainerError> + Send + Sync>;

/// What a name is bound to. The kind is inspected when the name is resolved.
#[derive(Clone)]
pub enum Source {
    /// A pre-built value, handed out unchanged.
    Value(Instance),
    /// A zero-argument factory.
    Factory(FactoryFn),
    /// A constructible class whose dependencies are injected.
    Class(ComponentClass),
}

impl Source {
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Value(_) => "value",
            Source::Factory(_) => "factory",
            Source::Class(_) => "class",
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Value(instance) => f.debug_tuple("Value").field(&(**instance).type_name()).finish(),
            Source::Factory(_) => f.write_str("Factory"),
            Source::Class(class) => f.debug_tuple("Class").field(class).finish(),
        }
    }
}

/// How long a resolved instance lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    /// Resolved once and cached for the lifetime of the container.
    #[default]
    Singleton,
    /// Constructed anew on every resolution and never cached.
    Transient,
}

/// Resolution state of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    Resolving,
    Resolved,
}

/// A name's binding to its source.
#[derive(Debug, Clone)]
pub struct Registration {
    source: Source,
    lifetime: Lifetime,
}

impl Registration {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            lifetime: Lifetime::Singleton,
        }
    }

    /// Register a pre-built value.
    pub fn value<T: Component>(value: Arc<T>) -> Self {
        Self::new(Source::Value(value))
    }

    pub fn instance(instance: Instance) -> Self {
        Self::new(Source::Value(instance))
    }

    /// Register a zero-argument factory.
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: Component,
        F: Fn() -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        Self::new(Source::Factory(Arc::new(move || {
            factory().map(|c| Arc::new(c) as Instance)
        })))
    }

    pub fn class(class: ComponentClass) -> Self {
        Self::new(Source::Class(class))
    }

    pub fn injectable<T: Injectable>() -> Self {
        Self::class(T::component_class())
    }

    pub fn transient(mut self) -> Self {
        self.lifetime = Lifetime::Transient;
        self
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }
}

/// Caller-supplied values that take precedence over the registry for the
/// dependencies of a single resolution.
#[derive(Clone, Default)]
pub struct Overrides {
    values: HashMap<String, Instance>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Component>(self, name: &str, value: Arc<T>) -> Self {
        self.with_instance(name, value)
    }

    pub fn with_instance(mut self, name: &str, value: Instance) -> Self {
        self.values.insert(strip_marker(name).to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.values.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Registry entry: the registration plus its resolution state.
pub(crate) struct Entry {
    pub registration: Registration,
    pub state: ResolutionState,
    pub instance: Option<Instance>,
    /// Position in resolution order, set when the instance is cached.
    pub resolved_seq: Option<u64>,
}

impl Entry {
    pub fn new(registration: Registration) -> Self {
        Self {
            registration,
            state: ResolutionState::Unresolved,
            instance: None,
            resolved_seq: None,
        }
    }
}
