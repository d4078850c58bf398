//! Registrations held by the container.

mod registration;

pub use registration::{FactoryFn, Lifetime, Overrides, Registration, ResolutionState, Source};
pub(crate) use registration::Entry;
