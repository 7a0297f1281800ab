//! Direct native-currency transfers out of the treasury.
//!
//! Validation happens before any transaction is built: address syntax,
//! amount in `(0, 10]` ETH, and a treasury balance covering the amount plus
//! a gas reserve. Transfers never touch the settlement ledger.

use alloy::primitives::{Address, U256};
use std::sync::Arc;

use crate::blockchain::transaction::{CallRequest, TxSubmitter};
use crate::blockchain::units::{eth_to_wei, wei_to_eth};
use crate::observability::metrics;
use crate::transfers::types::{TransferError, TransferKind, TransferReceipt};

/// Largest single transfer, in ETH.
pub const MAX_TRANSFER_ETH: f64 = 10.0;

/// Balance kept back for gas (0.001 ETH).
pub const GAS_RESERVE: U256 = U256::from_limbs([1_000_000_000_000_000, 0, 0, 0]);

/// Parse a 20-byte hex address, with a `0x`/`0X` prefix or none.
///
/// Mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_address(raw: &str) -> Result<Address, TransferError> {
    let invalid = || TransferError::InvalidAddress(raw.to_string());
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let normalized = format!("0x{hex}");
    let mixed_case = hex.chars().any(|c| c.is_ascii_lowercase())
        && hex.chars().any(|c| c.is_ascii_uppercase());
    if mixed_case {
        Address::parse_checksummed(&normalized, None).map_err(|_| invalid())
    } else {
        normalized.parse().map_err(|_| invalid())
    }
}

/// Check the amount is in `(0, MAX_TRANSFER_ETH]` and convert it to wei.
pub fn validate_amount(amount_eth: f64) -> Result<U256, TransferError> {
    if !amount_eth.is_finite() || amount_eth <= 0.0 || amount_eth > MAX_TRANSFER_ETH {
        return Err(TransferError::InvalidAmount(amount_eth));
    }
    eth_to_wei(amount_eth).ok_or(TransferError::InvalidAmount(amount_eth))
}

pub struct TransferService {
    submitter: Arc<TxSubmitter>,
    confirmation_timeout_secs: u64,
}

impl TransferService {
    pub fn new(submitter: Arc<TxSubmitter>, confirmation_timeout_secs: u64) -> Self {
        Self {
            submitter,
            confirmation_timeout_secs,
        }
    }

    /// Validate and execute a transfer of `amount_eth` to `destination`.
    pub async fn transfer(
        &self,
        kind: TransferKind,
        destination: &str,
        amount_eth: f64,
    ) -> Result<TransferReceipt, TransferError> {
        let result = self.execute(kind, destination, amount_eth).await;
        let outcome = match &result {
            Ok(_) => "confirmed",
            Err(TransferError::Chain(_)) => "failed",
            Err(_) => "rejected",
        };
        metrics::record_transfer(kind.as_str(), outcome);
        result
    }

    async fn execute(
        &self,
        kind: TransferKind,
        destination: &str,
        amount_eth: f64,
    ) -> Result<TransferReceipt, TransferError> {
        let recipient = parse_address(destination)?;
        let amount_wei = validate_amount(amount_eth)?;

        let chain = self.submitter.chain();
        let treasury = self.submitter.address();
        let chain_id = chain.chain_id().await?;
        let balance_before = chain.balance(treasury).await?;

        if balance_before < amount_wei.saturating_add(GAS_RESERVE) {
            return Err(TransferError::InsufficientBalance {
                balance_eth: wei_to_eth(balance_before),
            });
        }

        tracing::info!(
            kind = kind.as_str(),
            recipient = %recipient,
            amount_eth,
            network = %chain_id.network_label(),
            "Sending transfer"
        );

        let tx_hash = self
            .submitter
            .submit(CallRequest::transfer(recipient, amount_wei))
            .await?;
        let receipt = self
            .submitter
            .wait_for_receipt(tx_hash, self.confirmation_timeout_secs)
            .await?;
        let balance_after = chain.balance(treasury).await?;

        if receipt.status {
            tracing::info!(
                tx_hash = %tx_hash,
                block = receipt.block_number,
                balance_after_eth = wei_to_eth(balance_after),
                "Transfer confirmed"
            );
        } else {
            tracing::warn!(tx_hash = %tx_hash, block = receipt.block_number, "Transfer reverted");
        }

        Ok(TransferReceipt {
            kind,
            tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            status: receipt.status,
            recipient,
            amount_wei,
            treasury,
            balance_before,
            balance_after,
            chain_id,
        })
    }
}
