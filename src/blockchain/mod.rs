//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key, RPC URL)
//!     → wallet.rs (key loading, signing)
//!     → client.rs (RPC connection with timeouts)
//!     → transaction.rs (nonce lane, build, sign, broadcast, confirm)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or RPC API keys
//! - All RPC calls have configurable timeouts
//! - Graceful degradation when blockchain unreachable

pub mod client;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod transaction;
pub mod types;
pub mod units;
pub mod wallet;

pub use client::{ChainClient, RpcChainClient};
pub use transaction::{CallRequest, TxSubmitter};
pub use types::{BlockchainConfig, BlockchainError, ChainId, TxReceipt};
pub use wallet::Wallet;
