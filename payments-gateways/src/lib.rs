//! # Payments Gateways
//!
//! Health-gated routing of payment calls to external gateways.
//!
//! - `window` - bucketed rolling failure counter
//! - `breaker` - per-gateway availability tracker built on the window
//! - `chain` - ordered fallback chain, generic over the routed action
//! - `action` - the two routed actions: initiate and refund
//! - `clock` - system and manual clocks
//! - `json` - JSON-over-HTTP gateway adapter

pub mod action;
pub mod breaker;
pub mod chain;
pub mod clock;
pub mod json;
pub mod window;

pub use action::{GatewayAction, Initiate, Refund};
pub use breaker::{BreakerConfig, BreakerStatus, CircuitBreaker};
pub use chain::{GatewayChain, InitiateChain, RefundChain};
pub use clock::{ManualClock, SystemClock};
pub use json::{JsonGateway, JsonGatewayError};
pub use window::RollingWindow;
