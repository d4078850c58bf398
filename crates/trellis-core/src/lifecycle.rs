//! Container lifecycle state.

use std::sync::atomic::{AtomicU8, Ordering};

/// Container state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ContainerState {
    /// Accepting registrations and resolving components.
    Active = 0,
    /// Running teardown hooks.
    Disposing = 1,
    /// Teardown finished. Registrations remain readable.
    Disposed = 2,
}

impl From<u8> for ContainerState {
    fn from(v: u8) -> Self {
        match v {
            1 => ContainerState::Disposing,
            2 => ContainerState::Disposed,
            _ => ContainerState::Active,
        }
    }
}

/// Atomic holder for [`ContainerState`].
pub(crate) struct Lifecycle {
    state: AtomicU8,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ContainerState::Active as u8),
        }
    }

    pub fn state(&self) -> ContainerState {
        ContainerState::from(self.state.load(Ordering::SeqCst))
    }

    /// Move from `Active` to `Disposing`. Returns false if dispose already ran.
    pub fn begin_dispose(&self) -> bool {
        self.state
            .compare_exchange(
                ContainerState::Active as u8,
                ContainerState::Disposing as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    pub fn finish_dispose(&self) {
        self.state
            .store(ContainerState::Disposed as u8, Ordering::SeqCst);
    }
}
