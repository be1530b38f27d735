//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod clock;
mod gateway;
mod lock;
mod repository;
mod usecases;

pub use clock::Clock;
pub use gateway::{
    InitiateRequest, InitiateResponse, PaymentGateway, RefundRequest, RefundResponse,
    StatusUpdate, WebhookReader,
};
pub use lock::{DistributedLock, LockGuard};
pub use repository::PaymentRepository;
pub use usecases::{GetPayment, InitiatePayment, RefundPayment, UpdatePaymentStatus};
