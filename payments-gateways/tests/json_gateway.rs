//! JSON gateway adapter against a local HTTP server.

use std::time::Duration;

use axum::{Json, Router, http::StatusCode, routing::post};
use serde_json::{Value, json};

use payments_gateways::JsonGateway;
use payments_types::{
    Amount, CallContext, Currency, GatewayError, InitiateRequest, PaymentGateway, PaymentId,
    RefundRequest,
};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn gateway(base_url: &str, timeout: Duration) -> JsonGateway {
    JsonGateway::new(
        "json",
        base_url,
        reqwest::Client::new(),
        timeout,
        vec![Currency::AED],
    )
}

fn aed_request() -> InitiateRequest {
    InitiateRequest {
        payment_id: PaymentId::new(),
        amount: Amount::new(Currency::AED, 50, 0).unwrap(),
        metadata: Default::default(),
    }
}

fn upstream_message(err: GatewayError) -> String {
    match err {
        GatewayError::Upstream { gateway, source } => {
            assert_eq!(gateway, "json");
            source.to_string()
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_initiate_created() {
    let router = Router::new().route(
        "/initiate-payment",
        post(|Json(body): Json<Value>| async move {
            if body["amount"] != "50.00 AED" {
                return (StatusCode::BAD_REQUEST, Json(json!({})));
            }
            (StatusCode::CREATED, Json(json!({ "id": "123" })))
        }),
    );
    let gw = gateway(&serve(router).await, Duration::from_secs(5));

    let response = gw
        .initiate(&CallContext::background(), &aed_request())
        .await
        .unwrap();

    assert_eq!(response.external_id, "json-123");
}

#[tokio::test]
async fn test_initiate_unexpected_status() {
    let router = Router::new().route(
        "/initiate-payment",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let gw = gateway(&serve(router).await, Duration::from_secs(5));

    let err = gw
        .initiate(&CallContext::background(), &aed_request())
        .await
        .unwrap_err();

    assert_eq!(
        upstream_message(err),
        "invalid status code, 500 given, 201 expected"
    );
}

#[tokio::test]
async fn test_initiate_corrupted_body() {
    let router = Router::new().route(
        "/initiate-payment",
        post(|| async { (StatusCode::CREATED, "not json") }),
    );
    let gw = gateway(&serve(router).await, Duration::from_secs(5));

    let err = gw
        .initiate(&CallContext::background(), &aed_request())
        .await
        .unwrap_err();

    assert_eq!(upstream_message(err), "corrupted response format");
}

#[tokio::test]
async fn test_gateway_timeout_is_upstream_failure() {
    let router = Router::new().route(
        "/initiate-payment",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            StatusCode::CREATED
        }),
    );
    let gw = gateway(&serve(router).await, Duration::from_millis(100));

    let err = gw
        .initiate(&CallContext::background(), &aed_request())
        .await
        .unwrap_err();

    assert!(upstream_message(err).starts_with("no response within"));
}

#[tokio::test]
async fn test_caller_deadline_cancels() {
    let router = Router::new().route(
        "/initiate-payment",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            StatusCode::CREATED
        }),
    );
    let gw = gateway(&serve(router).await, Duration::from_secs(5));

    let ctx = CallContext::with_timeout(Duration::from_millis(100));
    let err = gw.initiate(&ctx, &aed_request()).await.unwrap_err();

    assert!(matches!(err, GatewayError::Cancelled));
}

#[tokio::test]
async fn test_refund_strips_namespace() {
    let router = Router::new().route(
        "/refund",
        post(|Json(body): Json<Value>| async move {
            let ok = body["id"] == "123";
            Json(json!({ "ok": ok }))
        }),
    );
    let gw = gateway(&serve(router).await, Duration::from_secs(5));
    let request = RefundRequest {
        external_id: "json-123".into(),
    };

    assert!(gw.supports_refund(&request));
    let response = gw
        .refund(&CallContext::background(), &request)
        .await
        .unwrap();
    assert!(response.ok);
}

#[tokio::test]
async fn test_refund_of_foreign_payment() {
    let gw = gateway("http://127.0.0.1:9", Duration::from_secs(1));
    let request = RefundRequest {
        external_id: "soap-123".into(),
    };

    assert!(!gw.supports_refund(&request));
    let err = gw
        .refund(&CallContext::background(), &request)
        .await
        .unwrap_err();
    assert!(upstream_message(err).contains("soap-123"));
}

#[test]
fn test_supports_configured_currencies_only() {
    let gw = gateway("http://127.0.0.1:9", Duration::from_secs(1));
    let mut request = aed_request();
    assert!(gw.supports(&request));

    request.amount = Amount::new(Currency::USD, 50, 0).unwrap();
    assert!(!gw.supports(&request));
}
