use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::warn;

use super::interface::ClusterInterface;
use crate::error::{AdminError, AdminResult};

/// The next cluster interface in the chain. Set once during startup; reads after that
/// need no locking.
#[derive(Default)]
pub struct DelegateLink {
    next: OnceCell<Arc<dyn ClusterInterface>>,
}

impl DelegateLink {
    pub fn new() -> Self { Self::default() }

    /// Panics if a delegate is already set: rewiring a live chain is a wiring bug.
    pub fn set(&self, next: Arc<dyn ClusterInterface>) {
        assert!(self.next.set(next).is_ok(), "cluster interface delegate set twice");
    }

    pub fn is_set(&self) -> bool { self.next.get().is_some() }

    /// The delegate, or the "Failed to find an interface." error.
    pub fn get(&self) -> AdminResult<&Arc<dyn ClusterInterface>> {
        self.next.get().ok_or_else(|| {
            warn!(target: "syscat::dispatch", "no cluster interface configured");
            AdminError::no_delegate()
        })
    }
}

impl fmt::Debug for DelegateLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateLink").field("set", &self.is_set()).finish()
    }
}
