//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` wins over the configured level when set

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Build the level filter from `RUST_LOG`, falling back to the config.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "treasury_engine={level},tower_http={level}",
            level = config.log_level
        ))
    })
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed (e.g. by a test).
pub fn init_logging(config: &ObservabilityConfig) -> bool {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    let result = match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        let config = ObservabilityConfig::default();
        let _ = init_logging(&config);
        assert!(!init_logging(&config));
    }
}
