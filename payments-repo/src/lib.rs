//! # Payments Repository
//!
//! Adapters for the payment store and lock ports.
//!
//! - `memory` - volatile in-memory [`PaymentRepository`] with transition guards
//! - `lock` - [`DistributedLock`] strategies: no-op and lease-based
//!
//! [`PaymentRepository`]: payments_types::PaymentRepository
//! [`DistributedLock`]: payments_types::DistributedLock

pub mod lock;
pub mod memory;

pub use lock::{LeaseLock, NoopLock};
pub use memory::InMemoryPaymentRepo;
