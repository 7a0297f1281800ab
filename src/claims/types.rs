//! Claim engine request, result and error types.

use alloy::primitives::{Address, TxHash, I256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::types::{BlockchainError, ChainId};
use crate::blockchain::units::eth_to_wei;
use crate::claims::sizing::SkipReason;
use crate::claims::variants::{CallVariant, VariantAttempt};

fn default_source() -> String {
    "site_activity".to_string()
}

/// An earning event as posted by a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningEvent {
    #[serde(rename = "amountUSD")]
    pub amount_usd: Option<f64>,
    #[serde(rename = "amountETH")]
    pub amount_eth: Option<f64>,
    pub hourly_rate: Option<f64>,
    #[serde(default = "default_source")]
    pub source: String,
    pub user_id: Option<String>,
    pub activity_type: Option<String>,
}

impl EarningEvent {
    /// Requested total in wei: `amountETH` when positive, otherwise
    /// `amountUSD / eth_price_usd`.
    pub fn requested_total(&self, eth_price_usd: f64) -> Result<U256, ClaimError> {
        if let Some(eth) = self.amount_eth.filter(|v| *v > 0.0) {
            return eth_to_wei(eth)
                .ok_or_else(|| ClaimError::InvalidAmount(format!("amountETH {eth} is not a valid amount")));
        }

        match self.amount_usd {
            Some(usd) if usd.is_finite() && usd >= 0.0 => eth_to_wei(usd / eth_price_usd)
                .ok_or_else(|| ClaimError::InvalidAmount(format!("amountUSD {usd} is not a valid amount"))),
            Some(usd) => Err(ClaimError::InvalidAmount(format!(
                "amountUSD {usd} is not a valid amount"
            ))),
            None => Err(ClaimError::InvalidAmount(
                "amountUSD is required unless amountETH is given".to_string(),
            )),
        }
    }
}

/// A confirmed, successful claim against one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimAttempt {
    pub contract: Address,
    pub variant: CallVariant,
    /// The sized amount, not what the contract actually paid.
    pub amount_wei: U256,
    pub tx_hash: TxHash,
    pub block_number: u64,
}

/// How one contract fared in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ContractOutcome {
    /// Never attempted.
    Skipped { reason: SkipReason },
    /// Balance could not be read; treated as a skip.
    Unreadable { error: String },
    /// Every variant was refused.
    Exhausted { attempts: Vec<VariantAttempt> },
    /// Accepted but failed on-chain.
    Reverted {
        attempts: Vec<VariantAttempt>,
        tx_hash: TxHash,
        block_number: u64,
    },
    /// Accepted and succeeded on-chain.
    Claimed {
        attempts: Vec<VariantAttempt>,
        claim: ClaimAttempt,
    },
}

/// Per-contract entry of a run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractReport {
    pub contract: Address,
    pub balance_wei: Option<U256>,
    #[serde(flatten)]
    pub outcome: ContractOutcome,
}

/// Aggregate of one earning event.
#[derive(Debug, Clone)]
pub struct ClaimResult {
    pub requested_total: U256,
    pub balance_before: U256,
    pub balance_after: U256,
    /// `balance_after - balance_before`; may be negative.
    pub actual_gained: I256,
    pub ledger_total: I256,
    pub successful_claims: Vec<ClaimAttempt>,
    pub reports: Vec<ContractReport>,
    pub contracts_attempted: usize,
    pub chain_id: ChainId,
}

impl ClaimResult {
    pub fn contracts_succeeded(&self) -> usize {
        self.successful_claims.len()
    }
}

/// Errors that abort an earning event.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// The event itself is malformed.
    #[error("Invalid earning event: {0}")]
    InvalidAmount(String),

    /// A chain read the whole run depends on failed, or a confirmation timed out.
    #[error(transparent)]
    Chain(#[from] BlockchainError),
}
