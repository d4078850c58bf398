//! # Trellis Core
//!
//! The component container behind the trellis command line.
//!
//! ## Components
//!
//! - [`Container`] - Registry of named components with singleton caching,
//!   dependency injection, and cycle detection
//! - [`ModuleManifest`] - Static table of modules loaded on first use
//! - [`PublicApi`] - Lazily resolved public names
//! - Command registration and hierarchical command matching
//!
//! ## Resolution
//!
//! A constructible class declares its dependencies as signature text. The
//! container reflects the names with [`parameter_names`], resolves each one
//! and hands them to the constructor in declaration order.

pub mod commands;
pub mod container;
pub mod lifecycle;
pub mod loader;
pub mod public;
pub mod reflect;
pub mod registry;

pub use commands::{
    command_key, CommandNames, CommandPath, HierarchicalCommand, Segment, COMMAND_SEPARATOR,
    DEFAULT_COMMAND_MARKER, DEV_COMMAND_PREFIX,
};
pub use container::{Container, ContainerOptions};
pub use lifecycle::ContainerState;
pub use loader::{ModuleLoader, ModuleManifest};
pub use public::{PublicApi, PublicClass, PublicValue};
pub use reflect::{parameter_names, strip_marker};
pub use registry::{Lifetime, Overrides, Registration, ResolutionState, Source};
