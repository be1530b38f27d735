//! Gateway port.
//!
//! A gateway is an external payment backend. Concrete integrations
//! (JSON over HTTP, SOAP, ...) implement [`PaymentGateway`] and are
//! injected into the routing chains at startup; nothing in the core
//! knows their wire format.

use std::collections::HashMap;

use crate::context::CallContext;
use crate::domain::{Amount, PaymentId, PaymentStatus};
use crate::error::GatewayError;

/// Request to start a payment on a gateway.
#[derive(Debug, Clone)]
pub struct InitiateRequest {
    pub payment_id: PaymentId,
    pub amount: Amount,
    /// Gateway-specific extras, passed through untouched
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiateResponse {
    pub external_id: String,
}

/// Request to refund a payment previously accepted by a gateway.
#[derive(Debug, Clone)]
pub struct RefundRequest {
    pub external_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundResponse {
    pub ok: bool,
}

/// Status change reported by a gateway webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub external_id: String,
    pub status: PaymentStatus,
}

/// Capability set of one payment backend.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Stable name used in logs and health snapshots.
    fn name(&self) -> &str;

    /// Whether this gateway can initiate the given payment.
    fn supports(&self, request: &InitiateRequest) -> bool;

    async fn initiate(
        &self,
        ctx: &CallContext,
        request: &InitiateRequest,
    ) -> Result<InitiateResponse, GatewayError>;

    /// Whether this gateway can refund the given payment.
    fn supports_refund(&self, request: &RefundRequest) -> bool;

    async fn refund(
        &self,
        ctx: &CallContext,
        request: &RefundRequest,
    ) -> Result<RefundResponse, GatewayError>;
}

/// Parses a gateway's inbound status webhook.
pub trait WebhookReader: Send + Sync {
    fn read_status_update(&self, body: &[u8]) -> Result<StatusUpdate, GatewayError>;
}
