//! Constructible component descriptions.

use std::fmt;
use std::sync::Arc;

use super::{Component, Dependencies, Instance};
use crate::error::ContainerError;

type ConstructFn = Arc<dyn Fn(Dependencies) -> Result<Instance, ContainerError> + Send + Sync>;

/// A constructible unit: a declared signature plus the code that builds an
/// instance from the dependencies named by that signature.
///
/// The signature is plain text (`fn new($fs, logger: Arc<Logger>)`,
/// `(fs, logger)` or `|fs, logger| ...`). The container reflects it when the
/// class is resolved and passes the dependencies to the constructor in
/// declaration order.
#[derive(Clone)]
pub struct ComponentClass {
    name: String,
    signature: String,
    construct: ConstructFn,
}

impl ComponentClass {
    /// Create a class whose constructor builds a concrete component.
    pub fn new<T, F>(name: impl Into<String>, signature: impl Into<String>, construct: F) -> Self
    where
        T: Component,
        F: Fn(Dependencies) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature: signature.into(),
            construct: Arc::new(move |deps| construct(deps).map(|c| Arc::new(c) as Instance)),
        }
    }

    /// Create a class whose constructor already produces an [`Instance`].
    pub fn from_instance_fn<F>(
        name: impl Into<String>,
        signature: impl Into<String>,
        construct: F,
    ) -> Self
    where
        F: Fn(Dependencies) -> Result<Instance, ContainerError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature: signature.into(),
            construct: Arc::new(construct),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Run the constructor with already-resolved dependencies.
    pub fn construct(&self, deps: Dependencies) -> Result<Instance, ContainerError> {
        (self.construct)(deps)
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

/// Types that can describe their own constructor.
///
/// Usually derived with `#[injectable]` from `trellis-macros`.
pub trait Injectable: Component + Sized {
    fn component_class() -> ComponentClass;
}
