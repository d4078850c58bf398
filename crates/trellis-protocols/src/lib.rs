//! # Trellis Protocols
//!
//! Trait and type definitions shared by the trellis container and the
//! components it manages. Contains no container logic.
//!
//! ## Core Traits
//!
//! - [`Component`] - Anything the container can hand out
//! - [`Command`] - A component that can be executed from the command line
//! - [`Injectable`] - A type that knows how to describe its own constructor

pub mod command;
pub mod component;
pub mod error;

pub use command::Command;
pub use component::{
    downcast, AsAny, Component, ComponentClass, Dependencies, ExportedMethod, Initialization,
    Injectable, Instance, DEPENDENCY_MARKER,
};
pub use error::{CommandError, ComponentError, ContainerError};
