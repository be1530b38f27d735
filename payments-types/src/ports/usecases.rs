//! Use-case ports.
//!
//! One trait per use-case keeps each seam narrow enough to wrap with a
//! decorator (tracing, metrics, auth) without touching the others.

use crate::context::CallContext;
use crate::domain::{Payment, PaymentId};
use crate::dto::{InitiatePaymentRequest, RefundOutcome, UpdateStatusRequest};
use crate::error::AppError;

#[async_trait::async_trait]
pub trait InitiatePayment: Send + Sync {
    async fn initiate_payment(
        &self,
        ctx: &CallContext,
        req: InitiatePaymentRequest,
    ) -> Result<Payment, AppError>;
}

#[async_trait::async_trait]
pub trait UpdatePaymentStatus: Send + Sync {
    async fn update_payment_status(
        &self,
        ctx: &CallContext,
        req: UpdateStatusRequest,
    ) -> Result<(), AppError>;
}

#[async_trait::async_trait]
pub trait RefundPayment: Send + Sync {
    async fn refund_payment(
        &self,
        ctx: &CallContext,
        id: PaymentId,
    ) -> Result<RefundOutcome, AppError>;
}

#[async_trait::async_trait]
pub trait GetPayment: Send + Sync {
    async fn get_payment(&self, ctx: &CallContext, id: PaymentId) -> Result<Payment, AppError>;
}
