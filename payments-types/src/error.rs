//! Error types for the payment router.

use crate::domain::{Currency, PaymentStatus};

/// Domain-level errors (invalid values supplied by the caller).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("invalid fractional value for {currency}, max {max}, given {given}")]
    InvalidFractional {
        currency: Currency,
        given: u64,
        max: u64,
    },

    #[error("amount {integer} {currency} cannot be represented in minor units")]
    AmountOverflow { currency: Currency, integer: u64 },

    #[error("unknown currency: {0}")]
    UnknownCurrency(String),
}

/// Repository-level errors (payment store failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("payment already exists")]
    Duplicate,

    #[error("payment does not exist")]
    NotFound,

    #[error("payment has status {from}, cannot move to {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("store operation cancelled: deadline exceeded")]
    Cancelled,
}

/// Errors raised while routing a call to a gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("no eligible gateway for {operation} request")]
    NoEligibleGateway { operation: &'static str },

    #[error("gateway {gateway} call failed: {source}")]
    Upstream {
        gateway: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("gateway call cancelled: deadline exceeded")]
    Cancelled,

    #[error("malformed webhook: {0}")]
    MalformedWebhook(String),
}

impl GatewayError {
    /// Wraps a failure of the named gateway, keeping the cause.
    pub fn upstream(
        gateway: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        GatewayError::Upstream {
            gateway: gateway.into(),
            source: source.into(),
        }
    }

    /// Whether the call reached the gateway and failed there.
    pub fn is_upstream(&self) -> bool {
        matches!(self, GatewayError::Upstream { .. })
    }
}

/// Distributed lock errors.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("lock {key} not acquired before deadline")]
    Timeout { key: String },
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate => AppError::Conflict(err.to_string()),
            RepoError::NotFound => AppError::NotFound("Payment not found".into()),
            RepoError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
            RepoError::Cancelled => AppError::Timeout(err.to_string()),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NoEligibleGateway { .. } => AppError::Unavailable(err.to_string()),
            // The cause may carry gateway internals; it is logged, not returned.
            GatewayError::Upstream { .. } => AppError::BadGateway("payment gateway error".into()),
            GatewayError::Cancelled => AppError::Timeout(err.to_string()),
            GatewayError::MalformedWebhook(msg) => AppError::BadRequest(msg),
        }
    }
}

impl From<LockError> for AppError {
    fn from(err: LockError) -> Self {
        AppError::Timeout(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_cause_not_leaked() {
        let err = GatewayError::upstream("json", "secret merchant token rejected");
        assert!(err.is_upstream());
        assert!(err.to_string().contains("secret"));

        let app: AppError = err.into();
        assert!(matches!(&app, AppError::BadGateway(msg) if !msg.contains("secret")));
    }

    #[test]
    fn test_repo_error_mapping() {
        assert!(matches!(
            AppError::from(RepoError::Duplicate),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(RepoError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(RepoError::InvalidTransition {
                from: PaymentStatus::Paid,
                to: PaymentStatus::Paid
            }),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(RepoError::Cancelled),
            AppError::Timeout(_)
        ));
    }

    #[test]
    fn test_no_eligible_gateway_is_unavailable() {
        let app: AppError = GatewayError::NoEligibleGateway {
            operation: "initiate",
        }
        .into();
        assert!(matches!(app, AppError::Unavailable(_)));
    }
}
