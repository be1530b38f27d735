//! JSON-over-HTTP gateway adapter.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use payments_types::{
    CallContext, Currency, GatewayError, InitiateRequest, InitiateResponse, PaymentGateway,
    PaymentId, PaymentStatus, RefundRequest, RefundResponse, StatusUpdate, WebhookReader,
};

/// Failures of a single JSON exchange, wrapped into
/// [`GatewayError::Upstream`] before leaving the adapter.
#[derive(Debug, thiserror::Error)]
pub enum JsonGatewayError {
    #[error("could not perform http request: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid status code, {given} given, {expected} expected")]
    InvalidStatus { given: u16, expected: u16 },

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("corrupted response format")]
    CorruptedResponse,

    #[error("external id {0} was not issued by this gateway")]
    ForeignPayment(String),
}

#[derive(Serialize)]
struct InitiateBody<'a> {
    /// e.g. "100.15 AED"
    amount: String,
    reference: &'a PaymentId,
}

#[derive(Deserialize)]
struct InitiateReply {
    id: String,
}

#[derive(Serialize)]
struct RefundBody<'a> {
    id: &'a str,
}

#[derive(Deserialize)]
struct RefundReply {
    ok: bool,
}

#[derive(Deserialize)]
struct WebhookBody {
    id: String,
    status: PaymentStatus,
}

/// Gateway speaking a small JSON API.
///
/// External ids handed back to the router are namespaced as
/// `"{name}-{gateway id}"`, which is how refunds find their way back.
#[derive(Debug, Clone)]
pub struct JsonGateway {
    name: String,
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
    currencies: Vec<Currency>,
}

impl JsonGateway {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        client: reqwest::Client,
        timeout: Duration,
        currencies: Vec<Currency>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            timeout,
            currencies,
        }
    }

    fn external_id(&self, gateway_id: &str) -> String {
        format!("{}-{}", self.name, gateway_id)
    }

    fn gateway_id<'a>(&self, external_id: &'a str) -> Option<&'a str> {
        external_id
            .strip_prefix(self.name.as_str())?
            .strip_prefix('-')
            .filter(|id| !id.is_empty())
    }

    /// POSTs `body` to `path`, bounded by both the gateway timeout and
    /// the caller's deadline.
    async fn post<B, T>(
        &self,
        ctx: &CallContext,
        path: &str,
        body: &B,
        expected: StatusCode,
    ) -> Result<T, GatewayError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        debug!(gateway = %self.name, %url, "calling gateway");

        let exchange = tokio::time::timeout(self.timeout, self.exchange(&url, body, expected));
        match ctx.run(exchange).await {
            Err(_) => Err(GatewayError::Cancelled),
            Ok(Err(_)) => Err(GatewayError::upstream(
                &self.name,
                JsonGatewayError::Timeout(self.timeout),
            )),
            Ok(Ok(result)) => result.map_err(|e| GatewayError::upstream(&self.name, e)),
        }
    }

    async fn exchange<B, T>(
        &self,
        url: &str,
        body: &B,
        expected: StatusCode,
    ) -> Result<T, JsonGatewayError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self.client.post(url).json(body).send().await?;

        if response.status() != expected {
            return Err(JsonGatewayError::InvalidStatus {
                given: response.status().as_u16(),
                expected: expected.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|_| JsonGatewayError::CorruptedResponse)
    }
}

#[async_trait::async_trait]
impl PaymentGateway for JsonGateway {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, request: &InitiateRequest) -> bool {
        self.currencies
            .iter()
            .any(|c| c.is(&request.amount.currency()))
    }

    async fn initiate(
        &self,
        ctx: &CallContext,
        request: &InitiateRequest,
    ) -> Result<InitiateResponse, GatewayError> {
        let body = InitiateBody {
            amount: request.amount.to_string(),
            reference: &request.payment_id,
        };

        let reply: InitiateReply = self
            .post(ctx, "initiate-payment", &body, StatusCode::CREATED)
            .await?;

        Ok(InitiateResponse {
            external_id: self.external_id(&reply.id),
        })
    }

    fn supports_refund(&self, request: &RefundRequest) -> bool {
        self.gateway_id(&request.external_id).is_some()
    }

    async fn refund(
        &self,
        ctx: &CallContext,
        request: &RefundRequest,
    ) -> Result<RefundResponse, GatewayError> {
        let id = self.gateway_id(&request.external_id).ok_or_else(|| {
            GatewayError::upstream(
                &self.name,
                JsonGatewayError::ForeignPayment(request.external_id.clone()),
            )
        })?;

        let reply: RefundReply = self
            .post(ctx, "refund", &RefundBody { id }, StatusCode::OK)
            .await?;

        Ok(RefundResponse { ok: reply.ok })
    }
}

impl WebhookReader for JsonGateway {
    fn read_status_update(&self, body: &[u8]) -> Result<StatusUpdate, GatewayError> {
        let body: WebhookBody = serde_json::from_slice(body)
            .map_err(|e| GatewayError::MalformedWebhook(format!("could not decode request: {e}")))?;

        Ok(StatusUpdate {
            external_id: self.external_id(&body.id),
            status: body.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> JsonGateway {
        JsonGateway::new(
            "json",
            "http://localhost:1/",
            reqwest::Client::new(),
            Duration::from_secs(1),
            vec![Currency::AED],
        )
    }

    #[test]
    fn test_external_id_namespace() {
        let gw = gateway();
        assert_eq!(gw.external_id("123"), "json-123");
        assert_eq!(gw.gateway_id("json-123"), Some("123"));
        assert_eq!(gw.gateway_id("json-"), None);
        assert_eq!(gw.gateway_id("jsonx-123"), None);
        assert_eq!(gw.gateway_id("soap-123"), None);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        assert_eq!(gateway().base_url, "http://localhost:1");
    }

    #[test]
    fn test_read_status_update() {
        let update = gateway()
            .read_status_update(br#"{"id":"abc","status":"paid"}"#)
            .unwrap();

        assert_eq!(update.external_id, "json-abc");
        assert_eq!(update.status, PaymentStatus::Paid);
    }

    #[test]
    fn test_read_malformed_webhook() {
        let result = gateway().read_status_update(br#"{"id":"abc","status":"lost"}"#);
        assert!(matches!(result, Err(GatewayError::MalformedWebhook(_))));
    }
}
