//! Router wiring shared by the HTTP tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::Router;
use serde::Deserialize;

use payments_gateways::{BreakerConfig, InitiateChain, RefundChain};
use payments_hex::{HttpServer, PaymentService, RouteTimeouts};
use payments_repo::{InMemoryPaymentRepo, LeaseLock};
use payments_types::{
    CallContext, Currency, GatewayError, InitiateRequest, InitiateResponse, PaymentGateway,
    PaymentStatus, RefundRequest, RefundResponse, StatusUpdate, WebhookReader,
};

/// In-process gateway that accepts one currency and namespaces its ids.
pub struct StubGateway {
    name: String,
    currency: Currency,
    failing: AtomicBool,
}

impl StubGateway {
    pub fn new(name: &str, currency: Currency) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            currency,
            failing: AtomicBool::new(false),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), GatewayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::upstream(&self.name, "upstream returned 500"));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, request: &InitiateRequest) -> bool {
        request.amount.currency() == self.currency
    }

    async fn initiate(
        &self,
        _ctx: &CallContext,
        request: &InitiateRequest,
    ) -> Result<InitiateResponse, GatewayError> {
        self.check()?;
        Ok(InitiateResponse {
            external_id: format!("{}-{}", self.name, request.payment_id),
        })
    }

    fn supports_refund(&self, request: &RefundRequest) -> bool {
        request.external_id.starts_with(&format!("{}-", self.name))
    }

    async fn refund(
        &self,
        _ctx: &CallContext,
        _request: &RefundRequest,
    ) -> Result<RefundResponse, GatewayError> {
        self.check()?;
        Ok(RefundResponse { ok: true })
    }
}

#[derive(Deserialize)]
struct Callback {
    id: String,
    status: PaymentStatus,
}

impl WebhookReader for StubGateway {
    fn read_status_update(&self, body: &[u8]) -> Result<StatusUpdate, GatewayError> {
        let callback: Callback = serde_json::from_slice(body)
            .map_err(|e| GatewayError::MalformedWebhook(e.to_string()))?;
        Ok(StatusUpdate {
            external_id: format!("{}-{}", self.name, callback.id),
            status: callback.status,
        })
    }
}

/// Router over a single "stub" gateway accepting USD.
pub fn router(gateway: Arc<StubGateway>) -> Router {
    let as_gateway: Arc<dyn PaymentGateway> = gateway.clone();
    let gateways = vec![as_gateway];

    let service = PaymentService::new(
        InMemoryPaymentRepo::new(),
        InitiateChain::with_system_clock(gateways.clone(), BreakerConfig::default()),
        RefundChain::with_system_clock(gateways, BreakerConfig::default()),
        Arc::new(LeaseLock::new(std::time::Duration::from_secs(30))),
    );

    let reader: Arc<dyn WebhookReader> = gateway;
    let webhooks = HashMap::from([("stub".to_string(), reader)]);

    HttpServer::new(service, webhooks, RouteTimeouts::default()).router()
}
