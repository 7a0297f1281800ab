//! Configuration validation.
//!
//! Semantic checks on top of what serde already enforces. Every problem is
//! reported, not only the first.
//!
//! The RPC URL is checked separately: a bad URL leaves the service running in
//! a degraded state instead of refusing to start.

use std::net::SocketAddr;
use thiserror::Error;

use crate::claims::targets::TARGET_CONTRACTS;
use crate::config::schema::TreasuryConfig;

/// Slack on top of the confirmation waits for balance reads and signing.
pub const REQUEST_HEADROOM_SECS: u64 = 30;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("eth_price_usd must be a positive finite number, got {0}")]
    Price(f64),

    #[error("request_timeout_secs ({request}) must exceed {required}s: one confirmation wait per target plus headroom")]
    RequestDeadline { request: u64, required: u64 },

    #[error("rpc_url is not set")]
    MissingRpcUrl,

    #[error("invalid rpc_url: {0}")]
    RpcUrl(String),
}

/// Validate everything the process needs to start listening.
pub fn validate_config(config: &TreasuryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let price = config.pricing.eth_price_usd;
    if !price.is_finite() || price <= 0.0 {
        errors.push(ValidationError::Price(price));
    }

    let chain = &config.blockchain;
    for (field, value) in [
        ("rpc_timeout_secs", chain.rpc_timeout_secs),
        ("confirmation_timeout_secs", chain.confirmation_timeout_secs),
        ("receipt_poll_interval_ms", chain.receipt_poll_interval_ms),
        ("request_timeout_secs", config.listener.request_timeout_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::NotPositive { field });
        }
    }

    // A claim run may wait for one confirmation per target
    let required = chain
        .confirmation_timeout_secs
        .saturating_mul(TARGET_CONTRACTS.len() as u64)
        .saturating_add(REQUEST_HEADROOM_SECS);
    if config.listener.request_timeout_secs <= required {
        errors.push(ValidationError::RequestDeadline {
            request: config.listener.request_timeout_secs,
            required,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that the RPC URL is present and uses a supported scheme.
pub fn validate_rpc_url(raw: &str) -> Result<(), ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::MissingRpcUrl);
    }
    let url = url::Url::parse(raw.trim()).map_err(|e| ValidationError::RpcUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ValidationError::RpcUrl(format!("unsupported scheme '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&TreasuryConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = TreasuryConfig::default();
        config.listener.bind_address = "nope".to_string();
        config.pricing.eth_price_usd = 0.0;
        config.blockchain.rpc_timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::BindAddress("nope".to_string())));
        assert!(errors.contains(&ValidationError::Price(0.0)));
        assert!(errors.contains(&ValidationError::NotPositive { field: "rpc_timeout_secs" }));
    }

    #[test]
    fn test_request_deadline_must_cover_confirmation() {
        let mut config = TreasuryConfig::default();
        config.listener.request_timeout_secs = 60;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::RequestDeadline { .. }));
    }

    #[test]
    fn test_request_deadline_covers_every_target() {
        let mut config = TreasuryConfig::default();
        config.blockchain.confirmation_timeout_secs = 2;

        // One confirmation wait fits, three do not
        config.listener.request_timeout_secs = 3;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::RequestDeadline { request: 3, required: 36 }]
        );

        config.listener.request_timeout_secs = 37;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rpc_url() {
        assert_eq!(validate_rpc_url(""), Err(ValidationError::MissingRpcUrl));
        assert!(validate_rpc_url("https://eth-mainnet.example.com/v2/key").is_ok());
        assert!(validate_rpc_url("http://localhost:8545").is_ok());
        assert!(validate_rpc_url("ftp://example.com").is_err());
        assert!(validate_rpc_url("not a url").is_err());
    }
}
