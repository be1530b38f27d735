//! Time source port, injectable so availability windows can be driven
//! deterministically in tests.

use tokio::time::Instant;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}
