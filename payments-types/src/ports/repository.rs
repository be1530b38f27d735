//! Payment repository port.
//!
//! The repository is the only owner of payment records. Callers get
//! copies back, and every state change goes through one of the two
//! transition operations below.

use crate::context::CallContext;
use crate::domain::{Payment, PaymentId, PaymentStatus};
use crate::error::RepoError;

#[async_trait::async_trait]
pub trait PaymentRepository: Send + Sync + 'static {
    /// Stores a new payment.
    ///
    /// Fails with [`RepoError::Duplicate`] when the id or the external id
    /// is already taken. Atomic with respect to concurrent creates.
    async fn create(&self, ctx: &CallContext, payment: Payment) -> Result<(), RepoError>;

    /// Moves the payment with `external_id` out of `Initiated`.
    async fn update_status_by_external_id(
        &self,
        ctx: &CallContext,
        external_id: &str,
        status: PaymentStatus,
    ) -> Result<(), RepoError>;

    /// Returns a copy of the payment.
    async fn get_by_id(&self, ctx: &CallContext, id: PaymentId) -> Result<Payment, RepoError>;

    /// Moves a `Paid` payment to `Refunded`.
    async fn refund_by_id(&self, ctx: &CallContext, id: PaymentId) -> Result<(), RepoError>;
}
