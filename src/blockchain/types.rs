//! Chain-specific types and error definitions.

use alloy::primitives::TxHash;
use serde::Serialize;
use thiserror::Error;

// Re-export BlockchainConfig from config module to avoid duplication
pub use crate::config::schema::BlockchainConfig;

/// Ethereum mainnet chain id.
pub const MAINNET_CHAIN_ID: u64 = 1;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Human-readable network label used in responses and logs.
    pub fn network_label(&self) -> String {
        if self.0 == MAINNET_CHAIN_ID {
            "MAINNET".to_string()
        } else {
            format!("Chain-{}", self.0)
        }
    }

    pub fn is_mainnet(&self) -> bool {
        self.0 == MAINNET_CHAIN_ID
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// No receipt was observed before the confirmation deadline.
    #[error("Transaction {tx_hash} not confirmed within {timeout_secs} seconds")]
    ConfirmationTimeout { tx_hash: TxHash, timeout_secs: u64 },

    /// Transaction descriptor could not be assembled.
    #[error("Transaction build failed: {0}")]
    Build(String),

    /// Invalid private key format or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The node refused the signed transaction.
    #[error("Broadcast rejected: {0}")]
    Rejected(String),

    /// Blockchain client not initialized or disabled.
    #[error("Blockchain not available: {0}")]
    NotAvailable(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Minimal view of a transaction receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    /// `true` when the transaction executed successfully.
    pub status: bool,
    pub block_number: u64,
    pub gas_used: u64,
}

impl From<&alloy::rpc::types::TransactionReceipt> for TxReceipt {
    fn from(receipt: &alloy::rpc::types::TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            status: receipt.status(),
            block_number: receipt.block_number.unwrap_or_default(),
            gas_used: receipt.gas_used,
        }
    }
}
