//! HTTP request handlers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use payments_types::{
    AppError, CallContext, GetPayment, InitiatePayment, InitiatePaymentRequest, PaymentId,
    PaymentRepository, PaymentResponse, RefundOutcome, RefundPayment, RefundPaymentRequest,
    UpdatePaymentStatus, UpdateStatusRequest, WebhookReader,
};

use crate::PaymentService;
use crate::service::GatewayHealth;

/// Deadline given to each route's call context.
#[derive(Debug, Clone, Copy)]
pub struct RouteTimeouts {
    pub initiate: Duration,
    pub webhook: Duration,
    pub refund: Duration,
    pub read: Duration,
}

impl Default for RouteTimeouts {
    fn default() -> Self {
        Self {
            initiate: Duration::from_secs(5),
            webhook: Duration::from_secs(1),
            refund: Duration::from_secs(5),
            read: Duration::from_secs(1),
        }
    }
}

/// Application state shared across handlers.
pub struct AppState<R: PaymentRepository> {
    pub service: PaymentService<R>,
    /// Webhook decoders keyed by the gateway name used in the route.
    pub webhooks: HashMap<String, Arc<dyn WebhookReader>>,
    pub timeouts: RouteTimeouts,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AppError::BadRequest(rejection.body_text()))
    }
}

/// JSON body extractor whose rejections use the API error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Circuit state of every configured gateway.
pub async fn gateways<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Json<GatewayHealth> {
    Json(state.service.gateway_health())
}

/// Start a payment through the first healthy gateway that accepts it.
#[tracing::instrument(skip_all, fields(payment_id = %req.id))]
pub async fn initiate_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    ApiJson(req): ApiJson<InitiatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = CallContext::with_timeout(state.timeouts.initiate);
    let payment = state.service.initiate_payment(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(PaymentResponse::from(payment))))
}

/// Status callback from a gateway.
#[tracing::instrument(skip(state, body))]
pub async fn gateway_webhook<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(gateway): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let reader = state
        .webhooks
        .get(&gateway)
        .ok_or_else(|| AppError::NotFound(format!("Unknown gateway {}", gateway)))?;
    let update = reader.read_status_update(&body).map_err(AppError::from)?;

    let ctx = CallContext::with_timeout(state.timeouts.webhook);
    state
        .service
        .update_payment_status(
            &ctx,
            UpdateStatusRequest {
                external_id: update.external_id,
                status: update.status,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}

/// Refund a paid payment.
#[tracing::instrument(skip_all, fields(payment_id = %req.id))]
pub async fn refund_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    ApiJson(req): ApiJson<RefundPaymentRequest>,
) -> Result<Json<RefundOutcome>, ApiError> {
    let ctx = CallContext::with_timeout(state.timeouts.refund);
    let outcome = state.service.refund_payment(&ctx, req.id).await?;
    Ok(Json(outcome))
}

/// Get payment by ID.
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn get_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment_id: PaymentId = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid payment ID".into()))?;

    let ctx = CallContext::with_timeout(state.timeouts.read);
    let payment = state.service.get_payment(&ctx, payment_id).await?;
    Ok(Json(PaymentResponse::from(payment)))
}
