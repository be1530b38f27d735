//! Configuration loading from flags and environment.

use std::time::Duration;

use clap::builder::RangedU64ValueParser;
use clap::{Parser, ValueEnum};

use payments_gateways::BreakerConfig;
use payments_hex::RouteTimeouts;
use payments_types::Currency;

const MAX_BREAKER_BUCKETS: u64 = 1_000;
/// One hour.
const MAX_BREAKER_BUCKET_MS: u64 = 3_600_000;

/// How refunds of the same payment are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LockStrategy {
    /// No mutual exclusion beyond the store's transition guards
    Noop,
    /// In-process leases with a TTL
    Lease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration.
#[derive(Debug, Parser)]
#[command(name = "payments-server")]
#[command(version, about = "Health-gated payment gateway router", long_about = None)]
pub struct Config {
    /// Listen port
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Base URL of the JSON gateway
    #[arg(long, env = "JSON_GATEWAY_URL", default_value = "http://localhost:8081")]
    pub json_gateway_url: String,

    /// Currencies the JSON gateway accepts (comma separated)
    #[arg(
        long,
        env = "JSON_GATEWAY_CURRENCIES",
        value_delimiter = ',',
        default_value = "AED"
    )]
    pub json_gateway_currencies: Vec<Currency>,

    #[arg(long, env = "JSON_GATEWAY_TIMEOUT_MS", default_value_t = 5000)]
    pub json_gateway_timeout_ms: u64,

    /// Failures within the lookback that mark a gateway unhealthy
    #[arg(long, env = "BREAKER_THRESHOLD", default_value_t = 10)]
    pub breaker_threshold: u32,

    #[arg(
        long,
        env = "BREAKER_BUCKETS",
        default_value_t = 5,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_BREAKER_BUCKETS)
    )]
    pub breaker_buckets: usize,

    #[arg(
        long,
        env = "BREAKER_BUCKET_MS",
        default_value_t = 1000,
        value_parser = clap::value_parser!(u64).range(1..=MAX_BREAKER_BUCKET_MS)
    )]
    pub breaker_bucket_ms: u64,

    #[arg(long, env = "INITIATE_TIMEOUT_MS", default_value_t = 5000)]
    pub initiate_timeout_ms: u64,

    #[arg(long, env = "WEBHOOK_TIMEOUT_MS", default_value_t = 1000)]
    pub webhook_timeout_ms: u64,

    #[arg(long, env = "REFUND_TIMEOUT_MS", default_value_t = 5000)]
    pub refund_timeout_ms: u64,

    #[arg(long, env = "LOCK_STRATEGY", value_enum, default_value_t = LockStrategy::Noop)]
    pub lock_strategy: LockStrategy,

    /// Lease TTL for the `lease` strategy
    #[arg(long, env = "LOCK_LEASE_MS", default_value_t = 30_000)]
    pub lock_lease_ms: u64,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn breaker(&self) -> BreakerConfig {
        BreakerConfig {
            threshold: self.breaker_threshold,
            buckets: self.breaker_buckets,
            bucket_width: Duration::from_millis(self.breaker_bucket_ms),
        }
    }

    pub fn route_timeouts(&self) -> RouteTimeouts {
        RouteTimeouts {
            initiate: Duration::from_millis(self.initiate_timeout_ms),
            webhook: Duration::from_millis(self.webhook_timeout_ms),
            refund: Duration::from_millis(self.refund_timeout_ms),
            ..RouteTimeouts::default()
        }
    }

    pub fn json_gateway_timeout(&self) -> Duration {
        Duration::from_millis(self.json_gateway_timeout_ms)
    }

    pub fn lock_lease(&self) -> Duration {
        Duration::from_millis(self.lock_lease_ms)
    }
}
