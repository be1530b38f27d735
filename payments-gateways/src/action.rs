//! Operations a gateway chain can route.
//!
//! Initiation and refund share the same selection algorithm and differ
//! only in the capability check and the gateway method invoked. Each is
//! a [`GatewayAction`], and breakers and chains are generic over it.

use std::future::Future;
use std::pin::Pin;

use payments_types::{
    CallContext, GatewayError, InitiateRequest, InitiateResponse, PaymentGateway, RefundRequest,
    RefundResponse,
};

/// Boxed future returned by a gateway call.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 'a>>;

pub trait GatewayAction: Send + Sync + 'static {
    type Request: Send + Sync;
    type Response: Send;

    /// Label used in logs and errors.
    const OPERATION: &'static str;

    fn supports(gateway: &dyn PaymentGateway, request: &Self::Request) -> bool;

    fn call<'a>(
        gateway: &'a dyn PaymentGateway,
        ctx: &'a CallContext,
        request: &'a Self::Request,
    ) -> GatewayFuture<'a, Self::Response>;
}

/// Payment initiation.
#[derive(Debug)]
pub enum Initiate {}

impl GatewayAction for Initiate {
    type Request = InitiateRequest;
    type Response = InitiateResponse;

    const OPERATION: &'static str = "initiate";

    fn supports(gateway: &dyn PaymentGateway, request: &InitiateRequest) -> bool {
        gateway.supports(request)
    }

    fn call<'a>(
        gateway: &'a dyn PaymentGateway,
        ctx: &'a CallContext,
        request: &'a InitiateRequest,
    ) -> GatewayFuture<'a, InitiateResponse> {
        gateway.initiate(ctx, request)
    }
}

/// Refund of a previously accepted payment.
#[derive(Debug)]
pub enum Refund {}

impl GatewayAction for Refund {
    type Request = RefundRequest;
    type Response = RefundResponse;

    const OPERATION: &'static str = "refund";

    fn supports(gateway: &dyn PaymentGateway, request: &RefundRequest) -> bool {
        gateway.supports_refund(request)
    }

    fn call<'a>(
        gateway: &'a dyn PaymentGateway,
        ctx: &'a CallContext,
        request: &'a RefundRequest,
    ) -> GatewayFuture<'a, RefundResponse> {
        gateway.refund(ctx, request)
    }
}
