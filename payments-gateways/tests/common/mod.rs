//! Scripted gateways shared by the routing tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use payments_types::{
    Amount, CallContext, Currency, GatewayError, InitiateRequest, InitiateResponse,
    PaymentGateway, PaymentId, RefundRequest, RefundResponse,
};

pub struct MockGateway {
    name: String,
    supported: bool,
    failing: AtomicBool,
    delay: Option<Duration>,
    initiate_calls: AtomicUsize,
    refund_calls: AtomicUsize,
}

impl MockGateway {
    fn build(name: &str, supported: bool, failing: bool, delay: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            supported,
            failing: AtomicBool::new(failing),
            delay,
            initiate_calls: AtomicUsize::new(0),
            refund_calls: AtomicUsize::new(0),
        })
    }

    pub fn healthy(name: &str) -> Arc<Self> {
        Self::build(name, true, false, None)
    }

    pub fn failing(name: &str) -> Arc<Self> {
        Self::build(name, true, true, None)
    }

    pub fn unsupported(name: &str) -> Arc<Self> {
        Self::build(name, false, false, None)
    }

    pub fn slow(name: &str, delay: Duration) -> Arc<Self> {
        Self::build(name, true, false, Some(delay))
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn initiate_calls(&self) -> usize {
        self.initiate_calls.load(Ordering::SeqCst)
    }

    pub fn refund_calls(&self) -> usize {
        self.refund_calls.load(Ordering::SeqCst)
    }

    async fn outcome(&self) -> Result<(), GatewayError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::upstream(&self.name, "scripted failure"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, _request: &InitiateRequest) -> bool {
        self.supported
    }

    async fn initiate(
        &self,
        _ctx: &CallContext,
        request: &InitiateRequest,
    ) -> Result<InitiateResponse, GatewayError> {
        self.initiate_calls.fetch_add(1, Ordering::SeqCst);
        self.outcome().await?;
        Ok(InitiateResponse {
            external_id: format!("{}-{}", self.name, request.payment_id),
        })
    }

    fn supports_refund(&self, request: &RefundRequest) -> bool {
        self.supported && request.external_id.starts_with(&format!("{}-", self.name))
    }

    async fn refund(
        &self,
        _ctx: &CallContext,
        _request: &RefundRequest,
    ) -> Result<RefundResponse, GatewayError> {
        self.refund_calls.fetch_add(1, Ordering::SeqCst);
        self.outcome().await?;
        Ok(RefundResponse { ok: true })
    }
}

pub fn initiate_request() -> InitiateRequest {
    InitiateRequest {
        payment_id: PaymentId::new(),
        amount: Amount::new(Currency::AED, 999, 99).unwrap(),
        metadata: HashMap::new(),
    }
}
