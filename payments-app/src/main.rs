//! # Payments Application
//!
//! Binary that wires together all the components:
//! - Load configuration from flags and environment
//! - Build the gateway chains and the payment store
//! - Create the payment service
//! - Start the HTTP server

mod config;

use std::collections::HashMap;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use payments_gateways::{InitiateChain, JsonGateway, RefundChain};
use payments_hex::{HttpServer, PaymentService};
use payments_repo::{InMemoryPaymentRepo, LeaseLock, NoopLock};
use payments_types::{DistributedLock, PaymentGateway, WebhookReader};

use config::{Config, LockStrategy, LogFormat};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,payments_app=debug,payments_hex=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::parse();
    init_tracing(config.log_format);

    tracing::info!("Starting payment router on port {}", config.port);

    let client = reqwest::Client::builder().build()?;
    let json_gateway = Arc::new(JsonGateway::new(
        "json",
        &config.json_gateway_url,
        client,
        config.json_gateway_timeout(),
        config.json_gateway_currencies.clone(),
    ));
    tracing::info!(
        url = %config.json_gateway_url,
        currencies = ?config.json_gateway_currencies,
        "JSON gateway configured"
    );

    // Priority order: first entry is tried first.
    let primary: Arc<dyn PaymentGateway> = json_gateway.clone();
    let gateways = vec![primary];
    let mut webhooks: HashMap<String, Arc<dyn WebhookReader>> = HashMap::new();
    webhooks.insert(json_gateway.name().to_string(), json_gateway);

    let lock: Arc<dyn DistributedLock> = match config.lock_strategy {
        LockStrategy::Noop => Arc::new(NoopLock),
        LockStrategy::Lease => Arc::new(LeaseLock::new(config.lock_lease())),
    };
    tracing::info!(strategy = ?config.lock_strategy, "refund lock configured");

    let service = PaymentService::new(
        InMemoryPaymentRepo::new(),
        InitiateChain::with_system_clock(gateways.clone(), config.breaker()),
        RefundChain::with_system_clock(gateways, config.breaker()),
        lock,
    );

    // Create and run the HTTP server
    let server = HttpServer::new(service, webhooks, config.route_timeouts());
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    tracing::info!("Server stopped");
    Ok(())
}
