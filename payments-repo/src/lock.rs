//! Lock strategies for the refund use-case.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use payments_types::{CallContext, DistributedLock, LockError, LockGuard};

/// Lock that never contends. Correct for a single process, since the
/// payment store already serialises transitions on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLock;

#[async_trait]
impl DistributedLock for NoopLock {
    async fn acquire(&self, _ctx: &CallContext, _key: &str) -> Result<LockGuard, LockError> {
        Ok(LockGuard::noop())
    }
}

#[derive(Debug, Clone, Copy)]
struct Lease {
    token: Uuid,
    expires_at: Instant,
}

/// Lease-based lock.
///
/// A holder owns the key until it drops its guard or the lease expires,
/// whichever comes first, so a crashed holder cannot block the key
/// forever. Waiters wake on release and re-check at `retry_interval`
/// to pick up expired leases.
#[derive(Debug, Clone)]
pub struct LeaseLock {
    leases: Arc<DashMap<String, Lease>>,
    released: Arc<Notify>,
    ttl: Duration,
    retry_interval: Duration,
}

impl LeaseLock {
    pub fn new(ttl: Duration) -> Self {
        Self {
            leases: Arc::new(DashMap::new()),
            released: Arc::new(Notify::new()),
            ttl,
            retry_interval: Duration::from_millis(10),
        }
    }

    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    /// Whether `key` is currently held by an unexpired lease.
    pub fn is_held(&self, key: &str) -> bool {
        self.leases
            .get(key)
            .is_some_and(|lease| lease.expires_at > Instant::now())
    }

    fn try_acquire(&self, key: &str) -> Option<LockGuard> {
        let now = Instant::now();
        let lease = Lease {
            token: Uuid::new_v4(),
            expires_at: now + self.ttl,
        };

        match self.leases.entry(key.to_string()) {
            Entry::Occupied(mut held) => {
                if held.get().expires_at > now {
                    return None;
                }
                debug!(key, "taking over expired lease");
                held.insert(lease);
            }
            Entry::Vacant(free) => {
                free.insert(lease);
            }
        }

        let leases = self.leases.clone();
        let released = self.released.clone();
        let key = key.to_string();
        Some(LockGuard::new(move || {
            leases.remove_if(&key, |_, held| held.token == lease.token);
            released.notify_waiters();
        }))
    }
}

#[async_trait]
impl DistributedLock for LeaseLock {
    async fn acquire(&self, ctx: &CallContext, key: &str) -> Result<LockGuard, LockError> {
        let wait = async {
            loop {
                let released = self.released.notified();
                if let Some(guard) = self.try_acquire(key) {
                    return guard;
                }
                tokio::select! {
                    _ = released => {}
                    _ = tokio::time::sleep(self.retry_interval) => {}
                }
            }
        };

        ctx.run(wait).await.map_err(|_| LockError::Timeout {
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_lock_never_blocks() {
        let lock = NoopLock;
        let ctx = CallContext::background();
        let _a = lock.acquire(&ctx, "payment:1").await.unwrap();
        let _b = lock.acquire(&ctx, "payment:1").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_lease_excludes_second_holder() {
        let lock = LeaseLock::new(Duration::from_secs(30));
        let guard = lock
            .acquire(&CallContext::background(), "payment:1")
            .await
            .unwrap();
        assert!(lock.is_held("payment:1"));

        let ctx = CallContext::with_timeout(Duration::from_millis(100));
        let result = lock.acquire(&ctx, "payment:1").await;
        assert!(matches!(result, Err(LockError::Timeout { key }) if key == "payment:1"));

        drop(guard);
        assert!(!lock.is_held("payment:1"));
        let ctx = CallContext::with_timeout(Duration::from_millis(100));
        assert!(lock.acquire(&ctx, "payment:1").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let lock = LeaseLock::new(Duration::from_secs(30));
        let ctx = CallContext::with_timeout(Duration::from_millis(100));

        let _a = lock.acquire(&ctx, "payment:1").await.unwrap();
        let _b = lock.acquire(&ctx, "payment:2").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_lease_is_taken_over() {
        let lock = LeaseLock::new(Duration::from_secs(1));
        let stale = lock
            .acquire(&CallContext::background(), "payment:1")
            .await
            .unwrap();

        let ctx = CallContext::with_timeout(Duration::from_secs(5));
        let fresh = lock.acquire(&ctx, "payment:1").await.unwrap();

        // the stale guard must not release the new holder's lease
        drop(stale);
        assert!(lock.is_held("payment:1"));
        drop(fresh);
        assert!(!lock.is_held("payment:1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiter_wakes_on_release() {
        let lock = LeaseLock::new(Duration::from_secs(30))
            .with_retry_interval(Duration::from_secs(60));
        let guard = lock
            .acquire(&CallContext::background(), "payment:1")
            .await
            .unwrap();

        let waiter = {
            let lock = lock.clone();
            tokio::spawn(async move {
                let ctx = CallContext::with_timeout(Duration::from_secs(10));
                lock.acquire(&ctx, "payment:1").await.is_ok()
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(guard);

        assert!(waiter.await.unwrap());
    }
}
