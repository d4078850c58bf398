//! Methods a component exposes through the public api.

use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use super::{downcast, Component, Instance};
use crate::error::ComponentError;

/// Future returned by an exported method call.
pub type ExportFuture = BoxFuture<'static, Result<Value, ComponentError>>;

type ExportFn = Arc<dyn Fn(Instance, Value) -> ExportFuture + Send + Sync>;

/// A method marked for export.
///
/// Only exported methods are reachable from a public class; everything else
/// on the component stays internal.
#[derive(Clone)]
pub struct ExportedMethod {
    name: String,
    call: ExportFn,
}

impl ExportedMethod {
    /// Export an async method of `T`.
    pub fn new<T, F, Fut>(name: impl Into<String>, method: F) -> Self
    where
        T: Component,
        F: Fn(Arc<T>, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ComponentError>> + Send + 'static,
    {
        let name = name.into();
        let export_name = name.clone();
        Self {
            name,
            call: Arc::new(move |instance, args| match downcast::<T>(&instance) {
                Some(this) => method(this, args).boxed(),
                None => future::ready(Err(ComponentError::Custom(format!(
                    "{} cannot be called on {}",
                    export_name,
                    (*instance).type_name()
                ))))
                .boxed(),
            }),
        }
    }

    /// Export a synchronous method of `T`.
    pub fn from_fn<T, F>(name: impl Into<String>, method: F) -> Self
    where
        T: Component,
        F: Fn(&T, Value) -> Result<Value, ComponentError> + Send + Sync + 'static,
    {
        let method = Arc::new(method);
        Self::new(name, move |this: Arc<T>, args| {
            let method = method.clone();
            async move { method(&this, args) }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the method on `instance`.
    pub fn call(&self, instance: Instance, args: Value) -> ExportFuture {
        (self.call)(instance, args)
    }
}

impl fmt::Debug for ExportedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportedMethod")
            .field("name", &self.name)
            .finish()
    }
}
