//! # Payments Hex
//!
//! Application service layer and HTTP adapter for the payment router.
//!
//! ## Architecture
//!
//! - `service` - Application service (gateway chains, store, refund lock)
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The service is generic over `R: PaymentRepository`, allowing
//! different store implementations to be injected.

pub mod inbound;
pub mod service;


pub use inbound::{HttpServer, RouteTimeouts};
pub use service::{GatewayHealth, PaymentService};
