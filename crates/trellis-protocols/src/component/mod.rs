//! Component protocol definitions.
//!
//! A component is any value the container hands out. Registration kinds
//! (pre-built value, factory, constructible class) all end up as an
//! [`Instance`] once resolved.

mod class;
mod dependencies;
mod export;

pub use class::*;
pub use dependencies::*;
pub use export::*;

use futures::future::BoxFuture;
use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use crate::command::Command;
use crate::error::ComponentError;

/// Leading character that may prefix a dependency name in a signature.
///
/// `$fs` and `fs` name the same component.
pub const DEPENDENCY_MARKER: char = '$';

/// A resolved component. Identity is pointer identity of the `Arc`.
pub type Instance = Arc<dyn Component>;

/// Downcasting support, implemented for every sized `Any + Send + Sync` type.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Core trait for everything managed by the container.
///
/// All hooks are optional. A component that does not override a hook is
/// treated as not having that capability.
pub trait Component: AsAny {
    /// Teardown run by `Container::dispose`. `None` means no teardown.
    fn dispose(&self) -> Option<Result<(), ComponentError>> {
        None
    }

    /// Post-construction hook run once when the component is first read from
    /// the public api. `None` means there is no initialize operation.
    fn initialize(self: Arc<Self>) -> Option<Initialization> {
        None
    }

    /// Methods exposed when the component is published as a public class.
    fn exports(&self) -> Vec<ExportedMethod> {
        Vec::new()
    }

    /// Returns the component as a command if it is one.
    fn as_command(self: Arc<Self>) -> Option<Arc<dyn Command>> {
        None
    }
}

/// Outcome of an initialize hook.
pub enum Initialization {
    /// Initialization ran to completion inside the hook.
    Completed(Result<(), ComponentError>),
    /// Initialization continues in the background. Nobody awaits it.
    Deferred(BoxFuture<'static, Result<(), ComponentError>>),
}

impl Initialization {
    pub fn done() -> Self {
        Initialization::Completed(Ok(()))
    }

    pub fn deferred<F>(future: F) -> Self
    where
        F: std::future::Future<Output = Result<(), ComponentError>> + Send + 'static,
    {
        Initialization::Deferred(Box::pin(future))
    }
}

/// Downcast a resolved instance to its concrete type.
pub fn downcast<T: Component>(instance: &Instance) -> Option<Arc<T>> {
    Arc::clone(instance).into_any().downcast::<T>().ok()
}

macro_rules! plain_components {
    ($($ty:ty),* $(,)?) => {
        $(impl Component for $ty {})*
    };
}

plain_components!(
    String,
    bool,
    i32,
    i64,
    u32,
    u64,
    f64,
    PathBuf,
    serde_json::Value,
);
