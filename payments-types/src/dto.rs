//! Data Transfer Objects (DTOs) for requests and responses.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Amount, Currency, Payment, PaymentId, PaymentStatus};

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

/// Request to initiate a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiatePaymentRequest {
    /// Caller-chosen payment identifier
    pub id: PaymentId,
    pub currency: Currency,
    /// Amount in the smallest currency unit (cents, fils, ...)
    pub amount_fractions: u64,
    /// Optional gateway-specific details
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl InitiatePaymentRequest {
    pub fn amount(&self) -> Amount {
        Amount::from_minor_units(self.currency, self.amount_fractions)
    }
}

/// Status change delivered by a gateway webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub external_id: String,
    pub status: PaymentStatus,
}

/// Request to refund a paid payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundPaymentRequest {
    pub id: PaymentId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundOutcome {
    pub ok: bool,
}

/// Outward view of a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub external_id: String,
    pub status: PaymentStatus,
    /// Human readable amount, e.g. "150.15 USD"
    pub amount: String,
    pub currency: Currency,
    pub amount_fractions: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            external_id: p.external_id,
            status: p.status,
            amount: p.amount.to_string(),
            currency: p.amount.currency(),
            amount_fractions: p.amount.to_minor_units(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
