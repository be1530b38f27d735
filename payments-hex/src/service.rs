//! Payment Application Service
//!
//! Orchestrates the gateway chains and the payment repository.
//! Contains NO infrastructure logic - pure business orchestration.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use payments_gateways::{BreakerStatus, InitiateChain, RefundChain};
use payments_types::{
    AppError, CallContext, DistributedLock, GatewayError, GetPayment, InitiatePayment,
    InitiatePaymentRequest, InitiateRequest, Payment, PaymentId, PaymentRepository,
    PaymentStatus, RefundOutcome, RefundPayment, RefundRequest, RepoError, UpdatePaymentStatus,
    UpdateStatusRequest,
};

/// Deadline for recording an outcome the gateway already confirmed.
/// It does not inherit the caller's deadline.
const COMMIT_GRACE: Duration = Duration::from_secs(5);

fn commit_context() -> CallContext {
    CallContext::with_timeout(COMMIT_GRACE)
}

/// Health of every gateway, per chain.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayHealth {
    pub initiate: Vec<BreakerStatus>,
    pub refund: Vec<BreakerStatus>,
}

/// Application service for payment operations.
///
/// Generic over `R: PaymentRepository` - the store is injected at compile
/// time. Gateways arrive already arranged into chains, and the lock
/// strategy is injected as a trait object.
pub struct PaymentService<R: PaymentRepository> {
    repo: R,
    initiator: InitiateChain,
    refunder: RefundChain,
    lock: Arc<dyn DistributedLock>,
}

impl<R: PaymentRepository> PaymentService<R> {
    pub fn new(
        repo: R,
        initiator: InitiateChain,
        refunder: RefundChain,
        lock: Arc<dyn DistributedLock>,
    ) -> Self {
        Self {
            repo,
            initiator,
            refunder,
            lock,
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn gateway_health(&self) -> GatewayHealth {
        GatewayHealth {
            initiate: self.initiator.statuses(),
            refund: self.refunder.statuses(),
        }
    }
}

/// Logs the full cause of a gateway failure before it is flattened into
/// an outward error.
fn gateway_failure(err: GatewayError) -> AppError {
    match &err {
        GatewayError::Upstream { .. } => error!(error = %err, "gateway call failed"),
        _ => warn!(error = %err, "gateway call not completed"),
    }
    err.into()
}

#[async_trait]
impl<R: PaymentRepository> InitiatePayment for PaymentService<R> {
    #[instrument(skip_all, fields(payment_id = %req.id, amount = %req.amount()))]
    async fn initiate_payment(
        &self,
        ctx: &CallContext,
        req: InitiatePaymentRequest,
    ) -> Result<Payment, AppError> {
        // Cheap early exit; `create` below still guards the race.
        match self.repo.get_by_id(ctx, req.id).await {
            Ok(_) => {
                return Err(AppError::Conflict(format!(
                    "Payment {} already exists",
                    req.id
                )));
            }
            Err(RepoError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let amount = req.amount();
        let response = self
            .initiator
            .dispatch(
                ctx,
                &InitiateRequest {
                    payment_id: req.id,
                    amount,
                    metadata: req.metadata,
                },
            )
            .await
            .map_err(gateway_failure)?;

        let payment = Payment::initiated(req.id, response.external_id, amount);
        if let Err(e) = self.repo.create(&commit_context(), payment.clone()).await {
            error!(
                external_id = %payment.external_id,
                error = %e,
                "gateway accepted payment but it could not be stored"
            );
            return Err(e.into());
        }

        info!(external_id = %payment.external_id, "payment initiated");
        Ok(payment)
    }
}

#[async_trait]
impl<R: PaymentRepository> UpdatePaymentStatus for PaymentService<R> {
    #[instrument(skip_all, fields(external_id = %req.external_id, status = %req.status))]
    async fn update_payment_status(
        &self,
        ctx: &CallContext,
        req: UpdateStatusRequest,
    ) -> Result<(), AppError> {
        self.repo
            .update_status_by_external_id(ctx, &req.external_id, req.status)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<R: PaymentRepository> RefundPayment for PaymentService<R> {
    #[instrument(skip(self, ctx), fields(payment_id = %id))]
    async fn refund_payment(
        &self,
        ctx: &CallContext,
        id: PaymentId,
    ) -> Result<RefundOutcome, AppError> {
        let _guard = self.lock.acquire(ctx, &format!("payment:{id}")).await?;

        let payment = self.repo.get_by_id(ctx, id).await?;
        if payment.status != PaymentStatus::Paid {
            return Err(AppError::Conflict(format!(
                "Payment {} cannot be refunded, it has status {}",
                id, payment.status
            )));
        }

        let response = self
            .refunder
            .dispatch(
                ctx,
                &RefundRequest {
                    external_id: payment.external_id,
                },
            )
            .await
            .map_err(gateway_failure)?;

        if !response.ok {
            warn!("gateway declined refund, payment stays paid");
            return Ok(RefundOutcome { ok: false });
        }

        if let Err(e) = self.repo.refund_by_id(&commit_context(), id).await {
            error!(error = %e, "gateway refunded payment but the refund could not be stored");
            return Err(e.into());
        }
        info!("payment refunded");
        Ok(RefundOutcome { ok: true })
    }
}

#[async_trait]
impl<R: PaymentRepository> GetPayment for PaymentService<R> {
    #[instrument(skip(self, ctx), fields(payment_id = %id))]
    async fn get_payment(&self, ctx: &CallContext, id: PaymentId) -> Result<Payment, AppError> {
        Ok(self.repo.get_by_id(ctx, id).await?)
    }
}
