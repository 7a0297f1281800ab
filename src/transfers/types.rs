//! Direct transfer request, receipt and error types.

use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::types::{BlockchainError, ChainId};

fn default_source() -> String {
    "user".to_string()
}

/// Withdrawal of treasury funds to a user wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub user_wallet: String,
    #[serde(rename = "amountETH")]
    pub amount_eth: f64,
    #[serde(rename = "amountUSD")]
    pub amount_usd: Option<f64>,
    pub backup_id: Option<String>,
    #[serde(default = "default_source")]
    pub source: String,
}

/// Funding of a contract address from the treasury.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingRequest {
    pub contract_address: String,
    #[serde(rename = "amountETH")]
    pub amount_eth: f64,
}

/// What a transfer is for. Both kinds share one code path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    UserWithdrawal,
    ContractFunding,
}

impl TransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::UserWithdrawal => "user_withdrawal",
            TransferKind::ContractFunding => "contract_funding",
        }
    }
}

/// Outcome of a confirmed transfer.
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub kind: TransferKind,
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    /// Receipt status; a plain transfer only fails on-chain in unusual cases.
    pub status: bool,
    pub recipient: Address,
    pub amount_wei: U256,
    pub treasury: Address,
    pub balance_before: U256,
    pub balance_after: U256,
    pub chain_id: ChainId,
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0} (must be greater than 0 and at most 10 ETH)")]
    InvalidAmount(f64),

    #[error("Insufficient treasury balance: {balance_eth} ETH")]
    InsufficientBalance { balance_eth: f64 },

    #[error(transparent)]
    Chain(#[from] BlockchainError),
}
