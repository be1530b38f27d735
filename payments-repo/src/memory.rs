//! Volatile, single-process payment store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

use payments_types::{
    CallContext, Payment, PaymentId, PaymentRepository, PaymentStatus, RepoError,
};

#[derive(Debug, Default)]
struct Tables {
    payments: HashMap<PaymentId, Payment>,
    /// Unique index on `Payment::external_id`
    by_external_id: HashMap<String, PaymentId>,
}

impl Tables {
    /// Applies `next` to the payment at `id` if the transition is legal.
    fn transition(&mut self, id: PaymentId, next: PaymentStatus) -> Result<(), RepoError> {
        let payment = self.payments.get_mut(&id).ok_or(RepoError::NotFound)?;
        if !payment.status.can_transition_to(next) {
            return Err(RepoError::InvalidTransition {
                from: payment.status,
                to: next,
            });
        }

        payment.status = next;
        payment.updated_at = Utc::now();
        Ok(())
    }
}

/// In-memory payment repository.
///
/// One table-wide `RwLock` guards both the records and the external-id
/// index, so a create and its uniqueness checks are a single critical
/// section and readers never see a half-applied change. Every lock
/// acquisition is bounded by the caller's deadline.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPaymentRepo {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryPaymentRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payments.
    pub async fn len(&self) -> usize {
        self.tables.read().await.payments.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn read(&self, ctx: &CallContext) -> Result<RwLockReadGuard<'_, Tables>, RepoError> {
        ctx.run(self.tables.read())
            .await
            .map_err(|_| RepoError::Cancelled)
    }

    async fn write(&self, ctx: &CallContext) -> Result<RwLockWriteGuard<'_, Tables>, RepoError> {
        ctx.run(self.tables.write())
            .await
            .map_err(|_| RepoError::Cancelled)
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepo {
    async fn create(&self, ctx: &CallContext, payment: Payment) -> Result<(), RepoError> {
        if payment.status != PaymentStatus::Initiated {
            return Err(RepoError::InvalidTransition {
                from: payment.status,
                to: PaymentStatus::Initiated,
            });
        }

        let mut tables = self.write(ctx).await?;

        if tables.payments.contains_key(&payment.id)
            || tables.by_external_id.contains_key(&payment.external_id)
        {
            return Err(RepoError::Duplicate);
        }

        info!(
            payment_id = %payment.id,
            external_id = %payment.external_id,
            amount = %payment.amount,
            "created payment"
        );

        tables
            .by_external_id
            .insert(payment.external_id.clone(), payment.id);
        tables.payments.insert(payment.id, payment);
        Ok(())
    }

    async fn update_status_by_external_id(
        &self,
        ctx: &CallContext,
        external_id: &str,
        status: PaymentStatus,
    ) -> Result<(), RepoError> {
        let mut tables = self.write(ctx).await?;
        let id = *tables
            .by_external_id
            .get(external_id)
            .ok_or(RepoError::NotFound)?;

        let current = tables.payments.get(&id).map(|p| p.status);
        if current != Some(PaymentStatus::Initiated) {
            return Err(match current {
                Some(from) => RepoError::InvalidTransition { from, to: status },
                None => RepoError::NotFound,
            });
        }

        tables.transition(id, status)?;
        info!(payment_id = %id, %external_id, %status, "payment status updated");
        Ok(())
    }

    async fn get_by_id(&self, ctx: &CallContext, id: PaymentId) -> Result<Payment, RepoError> {
        let tables = self.read(ctx).await?;
        tables.payments.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn refund_by_id(&self, ctx: &CallContext, id: PaymentId) -> Result<(), RepoError> {
        let mut tables = self.write(ctx).await?;
        tables.transition(id, PaymentStatus::Refunded)?;
        info!(payment_id = %id, "payment refunded");
        Ok(())
    }
}
