//! Errors raised while registering, loading, and resolving components.

use thiserror::Error;

use super::ComponentError;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Unable to resolve component: {0}")]
    UnknownComponent(String),

    #[error("Component already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Invalid signature `{signature}`: {reason}")]
    Signature { signature: String, reason: String },

    #[error("Circular dependency detected: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    #[error("Component {0} is being constructed on another thread")]
    ResolutionInProgress(String),

    #[error("Module {name} is already required from {existing}, cannot require it from {requested}")]
    DuplicateModule {
        name: String,
        existing: String,
        requested: String,
    },

    #[error("Module {path} required for {name} is not in the manifest")]
    ModuleNotFound { name: String, path: String },

    #[error("Invalid command name `{name}`: {reason}")]
    InvalidCommandName { name: String, reason: String },

    #[error("Command already registered: {0}")]
    DuplicateCommand(String),

    #[error("Component {name} is not of the expected type {expected}")]
    DependencyType { name: String, expected: &'static str },

    #[error("Missing dependency {0}")]
    MissingDependency(String),

    #[error("Failed to construct {component}: {source}")]
    Construction {
        component: String,
        #[source]
        source: ComponentError,
    },

    #[error("Component {0} is not a command")]
    NotACommand(String),

    #[error("{0} is not exposed on the public api")]
    NotPublic(String),

    #[error("{0} components failed during dispose")]
    DisposeFailed(usize),
}

impl ContainerError {
    /// Wrap a component failure raised while constructing `component`.
    pub fn construction(component: impl Into<String>, source: impl Into<ComponentError>) -> Self {
        ContainerError::Construction {
            component: component.into(),
            source: source.into(),
        }
    }

    pub fn signature(signature: impl Into<String>, reason: impl Into<String>) -> Self {
        ContainerError::Signature {
            signature: signature.into(),
            reason: reason.into(),
        }
    }
}
