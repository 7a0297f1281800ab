//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.
//! The treasury private key is deliberately absent: it only ever comes from
//! the environment.

use serde::{Deserialize, Serialize};

/// Root configuration for the treasury service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TreasuryConfig {
    /// Listener configuration (bind address, request deadline).
    pub listener: ListenerConfig,

    /// RPC endpoint and confirmation settings.
    pub blockchain: BlockchainConfig,

    /// Static price used to turn USD amounts into ether.
    pub pricing: PricingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Upper bound on a single HTTP request, in seconds.
    ///
    /// Claim runs wait for one confirmation per target in a row, so this must
    /// exceed `targets × blockchain.confirmation_timeout_secs` plus headroom.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 600,
        }
    }
}

/// Blockchain integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Chain the operator expects to be on. A mismatch is only logged.
    pub expected_chain_id: Option<u64>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// How long to wait for a receipt before failing the request.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub receipt_poll_interval_ms: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            expected_chain_id: Some(1),
            rpc_timeout_secs: 10,
            confirmation_timeout_secs: 120,
            receipt_poll_interval_ms: 2000,
        }
    }
}

/// Pricing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PricingConfig {
    /// USD per ether.
    pub eth_price_usd: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self { eth_price_usd: 3450.0 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
