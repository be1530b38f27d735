//! Payment domain model and its lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::amount::Amount;

/// Unique identifier for a Payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// Creates a new random PaymentId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a PaymentId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaymentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Lifecycle state of a payment.
///
/// ```text
/// Initiated ──► Failed | Expired | Paid
/// Paid ──► Refunded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Initiated,
    Failed,
    Expired,
    Paid,
    Refunded,
}

impl PaymentStatus {
    /// Whether a direct transition from `self` to `next` is legal.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Initiated, Failed) | (Initiated, Expired) | (Initiated, Paid) | (Paid, Refunded)
        )
    }

    /// No transition leaves a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PaymentStatus::Failed | PaymentStatus::Expired | PaymentStatus::Refunded
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Initiated => "initiated",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment routed through one of the gateways.
///
/// The amount is fixed at creation; only `status` (and `updated_at`)
/// change afterwards, and only through the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    /// Identifier assigned by the gateway that accepted the payment
    pub external_id: String,
    pub status: PaymentStatus,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a freshly initiated payment.
    pub fn initiated(id: PaymentId, external_id: impl Into<String>, amount: Amount) -> Self {
        let now = Utc::now();
        Self {
            id,
            external_id: external_id.into(),
            status: PaymentStatus::Initiated,
            amount,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Currency;

    const ALL: [PaymentStatus; 5] = [
        PaymentStatus::Initiated,
        PaymentStatus::Failed,
        PaymentStatus::Expired,
        PaymentStatus::Paid,
        PaymentStatus::Refunded,
    ];

    #[test]
    fn test_initiated_payment() {
        let amount = Amount::new(Currency::USD, 10, 0).unwrap();
        let payment = Payment::initiated(PaymentId::new(), "gw-1", amount);

        assert_eq!(payment.status, PaymentStatus::Initiated);
        assert_eq!(payment.external_id, "gw-1");
        assert_eq!(payment.created_at, payment.updated_at);
    }

    #[test]
    fn test_transitions() {
        let allowed = [
            (PaymentStatus::Initiated, PaymentStatus::Failed),
            (PaymentStatus::Initiated, PaymentStatus::Expired),
            (PaymentStatus::Initiated, PaymentStatus::Paid),
            (PaymentStatus::Paid, PaymentStatus::Refunded),
        ];

        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_terminal_states_have_no_exit() {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(ALL.iter().all(|to| !from.can_transition_to(*to)));
        }
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&PaymentStatus::Refunded).unwrap();
        assert_eq!(json, r#""refunded""#);

        let parsed: PaymentStatus = serde_json::from_str(r#""paid""#).unwrap();
        assert_eq!(parsed, PaymentStatus::Paid);
    }
}
