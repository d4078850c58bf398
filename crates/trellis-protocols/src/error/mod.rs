//! Error types for the trellis protocol layer.

mod command;
mod component;
mod container;

pub use command::*;
pub use component::*;
pub use container::*;
