//! # Payments Types
//!
//! Domain types and port traits for the payment router.
//! This crate has no IO of its own - only values, business rules,
//! and the trait definitions adapters implement.
//!
//! ## Architecture
//!
//! This crate is the **innermost core** of the hexagonal architecture:
//! - `domain/` - Currency, Amount, Payment and its state machine
//! - `ports/` - Gateway, repository, lock, clock and use-case traits
//! - `context` - Per-call deadline
//! - `dto` - Data Transfer Objects for API boundaries
//! - `error` - Domain, store, gateway and application error types

pub mod context;
pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use context::{CallContext, DeadlineExceeded};
pub use domain::{Amount, Currency, Payment, PaymentId, PaymentStatus};
pub use dto::*;
pub use error::{AppError, DomainError, GatewayError, LockError, RepoError};
pub use ports::{
    Clock, DistributedLock, GetPayment, InitiatePayment, InitiateRequest, InitiateResponse,
    LockGuard, PaymentGateway, PaymentRepository, RefundPayment, RefundRequest, RefundResponse,
    StatusUpdate, UpdatePaymentStatus, WebhookReader,
};
