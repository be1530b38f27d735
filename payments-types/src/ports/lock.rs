//! Distributed lock port.

use crate::context::CallContext;
use crate::error::LockError;

/// Held lock; dropping it releases the key.
pub struct LockGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl LockGuard {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A guard with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard")
            .field("held", &self.release.is_some())
            .finish()
    }
}

/// Mutual exclusion across request handlers (and, for real
/// implementations, across processes).
#[async_trait::async_trait]
pub trait DistributedLock: Send + Sync {
    async fn acquire(&self, ctx: &CallContext, key: &str) -> Result<LockGuard, LockError>;
}
