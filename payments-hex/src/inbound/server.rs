//! HTTP Server configuration and startup.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use payments_types::{PaymentRepository, WebhookReader};

use super::handlers::{self, AppState, RouteTimeouts};
use crate::PaymentService;

/// HTTP Server for the payment router API.
pub struct HttpServer<R: PaymentRepository> {
    state: Arc<AppState<R>>,
}

impl<R: PaymentRepository> HttpServer<R> {
    /// Creates a new HTTP server.
    ///
    /// `webhooks` maps the `{gateway}` path segment of the webhook route
    /// to the reader that decodes that gateway's callbacks.
    pub fn new(
        service: PaymentService<R>,
        webhooks: HashMap<String, Arc<dyn WebhookReader>>,
        timeouts: RouteTimeouts,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                service,
                webhooks,
                timeouts,
            }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/gateways", get(handlers::gateways::<R>))
            .route("/init-payment", post(handlers::initiate_payment::<R>))
            .route(
                "/external/{gateway}/webhook",
                post(handlers::gateway_webhook::<R>),
            )
            .route("/refund", post(handlers::refund_payment::<R>))
            .route("/payments/{id}", get(handlers::get_payment::<R>))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
