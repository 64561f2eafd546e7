//! Scoped "a modal is open" lock.
//!
//! Each open form holds a [`ModalGuard`]; the lock is released when the last
//! guard is dropped, so no code path can forget to undo it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ModalLock {
    holders: Arc<AtomicUsize>,
}

#[derive(Debug)]
pub struct ModalGuard {
    holders: Arc<AtomicUsize>,
}

impl ModalLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> ModalGuard {
        self.holders.fetch_add(1, Ordering::SeqCst);
        ModalGuard {
            holders: self.holders.clone(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.holders.load(Ordering::SeqCst) > 0
    }
}

impl Drop for ModalGuard {
    fn drop(&mut self) {
        self.holders.fetch_sub(1, Ordering::SeqCst);
    }
}
