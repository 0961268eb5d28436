use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Busy indicator for an in-flight action
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag {
    active: Arc<AtomicBool>,
}

impl LoadingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Raise the flag until the returned guard is dropped
    pub fn begin(&self) -> LoadingGuard {
        self.active.store(true, Ordering::Release);
        LoadingGuard {
            active: Arc::clone(&self.active),
        }
    }
}

/// Clears its flag on drop, whatever path the action left by
#[must_use = "the flag is cleared as soon as the guard is dropped"]
pub struct LoadingGuard {
    active: Arc<AtomicBool>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}
