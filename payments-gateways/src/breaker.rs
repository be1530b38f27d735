//! Per-gateway availability tracker.
//!
//! A breaker counts failed calls in a rolling window and reports the
//! gateway unhealthy while the count is at or above the threshold.
//! There is no half-open state: failures age out of the window and the
//! gateway becomes eligible again on its own.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use payments_types::{CallContext, Clock, GatewayError, PaymentGateway};

use crate::action::GatewayAction;
use crate::window::RollingWindow;

/// Breaker tuning, fixed for the lifetime of a breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Failures within the lookback that make a gateway unhealthy
    pub threshold: u32,
    /// Window resolution
    pub buckets: usize,
    pub bucket_width: Duration,
}

impl BreakerConfig {
    /// Saturates at `Duration::MAX` for extreme settings.
    pub fn lookback(&self) -> Duration {
        saturating_span(self.bucket_width, self.buckets)
    }
}

pub(crate) fn saturating_span(width: Duration, buckets: usize) -> Duration {
    u32::try_from(buckets)
        .ok()
        .and_then(|n| width.checked_mul(n))
        .unwrap_or(Duration::MAX)
}

impl Default for BreakerConfig {
    /// Ten failures within five one-second buckets.
    fn default() -> Self {
        Self {
            threshold: 10,
            buckets: 5,
            bucket_width: Duration::from_secs(1),
        }
    }
}

/// Point-in-time health of one gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerStatus {
    pub gateway: String,
    pub healthy: bool,
    pub recent_failures: u32,
    pub threshold: u32,
}

/// Availability tracker wrapping one gateway.
pub struct CircuitBreaker {
    gateway: Arc<dyn PaymentGateway>,
    window: Mutex<RollingWindow>,
    threshold: u32,
    clock: Arc<dyn Clock>,
}

impl CircuitBreaker {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        config: BreakerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let window = RollingWindow::new(config.buckets, config.bucket_width, clock.now());
        Self {
            gateway,
            window: Mutex::new(window),
            threshold: config.threshold,
            clock,
        }
    }

    /// Name of the wrapped gateway.
    pub fn name(&self) -> &str {
        self.gateway.name()
    }

    pub fn is_healthy(&self) -> bool {
        self.recent_failures() < self.threshold
    }

    pub fn recent_failures(&self) -> u32 {
        self.window().count(self.clock.now())
    }

    pub fn record_failure(&self) {
        let now = self.clock.now();
        let mut window = self.window();
        window.record(now);
        let failures = window.count(now);
        drop(window);

        if failures == self.threshold {
            warn!(
                gateway = self.name(),
                failures,
                "gateway marked unhealthy, excluded from routing"
            );
        }
    }

    /// Capability of the wrapped gateway; never affected by health.
    pub fn supports<A: GatewayAction>(&self, request: &A::Request) -> bool {
        A::supports(self.gateway.as_ref(), request)
    }

    /// Forwards the call, recording a failure if the gateway errors.
    ///
    /// The outcome is returned untouched. A call cut short by the
    /// caller's deadline yields [`GatewayError::Cancelled`] and is not
    /// held against the gateway.
    pub async fn dispatch<A: GatewayAction>(
        &self,
        ctx: &CallContext,
        request: &A::Request,
    ) -> Result<A::Response, GatewayError> {
        let result = match ctx.run(A::call(self.gateway.as_ref(), ctx, request)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Cancelled),
        };

        if let Err(err) = &result {
            if !matches!(err, GatewayError::Cancelled) {
                warn!(
                    gateway = self.name(),
                    operation = A::OPERATION,
                    error = %err,
                    "gateway call failed"
                );
                self.record_failure();
            }
        }

        result
    }

    pub fn status(&self) -> BreakerStatus {
        let recent_failures = self.recent_failures();
        BreakerStatus {
            gateway: self.name().to_string(),
            healthy: recent_failures < self.threshold,
            recent_failures,
            threshold: self.threshold,
        }
    }

    fn window(&self) -> MutexGuard<'_, RollingWindow> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("gateway", &self.name())
            .field("threshold", &self.threshold)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookback_is_buckets_times_width() {
        assert_eq!(BreakerConfig::default().lookback(), Duration::from_secs(5));
    }

    #[test]
    fn test_lookback_saturates_on_extreme_config() {
        let config = BreakerConfig {
            threshold: 1,
            buckets: usize::MAX,
            bucket_width: Duration::from_secs(1),
        };
        assert_eq!(config.lookback(), Duration::MAX);

        let config = BreakerConfig {
            threshold: 1,
            buckets: 4,
            bucket_width: Duration::MAX,
        };
        assert_eq!(config.lookback(), Duration::MAX);
    }
}
