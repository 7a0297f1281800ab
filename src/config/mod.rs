//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file (--config / TREASURY_CONFIG)
//!     → environment overrides (RPC_URL, ETH_PRICE_USD, PORT, ...)
//!     → validation.rs (semantic checks)
//!     → TreasuryConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - The private key never passes through this module

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BlockchainConfig, ListenerConfig, LogFormat, ObservabilityConfig, PricingConfig, TreasuryConfig,
};
