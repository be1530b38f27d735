//! Ordered fallback chain of health-gated gateways.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{Span, field, instrument, warn};

use payments_types::{CallContext, Clock, GatewayError, PaymentGateway};

use crate::action::{GatewayAction, Initiate, Refund};
use crate::breaker::{BreakerConfig, BreakerStatus, CircuitBreaker};
use crate::clock::SystemClock;

/// Chain routing payment initiations.
pub type InitiateChain = GatewayChain<Initiate>;
/// Chain routing refunds.
pub type RefundChain = GatewayChain<Refund>;

/// Gateways in priority order, each behind its own [`CircuitBreaker`].
///
/// A call goes to the first gateway that is healthy and supports the
/// request. Nothing is reordered or load-balanced; for the same health
/// and capability snapshot the same gateway always wins.
pub struct GatewayChain<A: GatewayAction> {
    breakers: Vec<CircuitBreaker>,
    _action: PhantomData<fn() -> A>,
}

impl<A: GatewayAction> GatewayChain<A> {
    pub fn new(
        gateways: impl IntoIterator<Item = Arc<dyn PaymentGateway>>,
        config: BreakerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let breakers = gateways
            .into_iter()
            .map(|gateway| CircuitBreaker::new(gateway, config, clock.clone()))
            .collect();

        Self {
            breakers,
            _action: PhantomData,
        }
    }

    /// Chain whose breakers run on wall-clock time.
    pub fn with_system_clock(
        gateways: impl IntoIterator<Item = Arc<dyn PaymentGateway>>,
        config: BreakerConfig,
    ) -> Self {
        Self::new(gateways, config, Arc::new(SystemClock))
    }

    pub fn breakers(&self) -> &[CircuitBreaker] {
        &self.breakers
    }

    /// First healthy breaker whose gateway supports the request.
    pub fn select(&self, request: &A::Request) -> Option<&CircuitBreaker> {
        self.breakers
            .iter()
            .find(|b| b.is_healthy() && b.supports::<A>(request))
    }

    /// Routes the request to the first eligible gateway.
    ///
    /// Fails immediately with [`GatewayError::NoEligibleGateway`] when no
    /// gateway qualifies; it never waits for one to recover and never
    /// falls through to the next gateway after a failure.
    #[instrument(
        name = "GatewayChain::dispatch",
        skip_all,
        fields(operation = A::OPERATION, selected = field::Empty)
    )]
    pub async fn dispatch(
        &self,
        ctx: &CallContext,
        request: &A::Request,
    ) -> Result<A::Response, GatewayError> {
        let Some(breaker) = self.select(request) else {
            warn!(gateways = self.breakers.len(), "no eligible gateway");
            return Err(GatewayError::NoEligibleGateway {
                operation: A::OPERATION,
            });
        };

        Span::current().record("selected", breaker.name());
        breaker.dispatch::<A>(ctx, request).await
    }

    pub fn statuses(&self) -> Vec<BreakerStatus> {
        self.breakers.iter().map(CircuitBreaker::status).collect()
    }
}

impl<A: GatewayAction> std::fmt::Debug for GatewayChain<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayChain")
            .field("operation", &A::OPERATION)
            .field("breakers", &self.breakers)
            .finish()
    }
}
