//! Response bodies and error mapping.
//!
//! Errors are always `{"success": false, "error": "<message>"}`:
//! - 400 for anything wrong with the request (checked before any transaction)
//! - 503 while the treasury is not initialized
//! - 500 for chain failures, including confirmation timeouts
//! - 504 when the router deadline passes; the work itself is not cancelled

use alloy::primitives::{Address, TxHash};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::blockchain::units::{signed_wei_to_eth, wei_to_eth};
use crate::blockchain::BlockchainError;
use crate::claims::types::ContractReport;
use crate::claims::{CallVariant, ClaimAttempt, ClaimError, ClaimResult};
use crate::transfers::{TransferError, TransferReceipt};

/// Block explorer prefix for transaction links.
pub const EXPLORER_TX_URL: &str = "https://etherscan.io/tx/";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Treasury service not initialized")]
    NotReady,

    #[error("{0}")]
    Internal(String),

    #[error("Request timed out; submitted transactions may still confirm")]
    Timeout,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }
        let body = serde_json::json!({ "success": false, "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

impl From<BlockchainError> for ApiError {
    fn from(e: BlockchainError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<ClaimError> for ApiError {
    fn from(e: ClaimError) -> Self {
        match e {
            invalid @ ClaimError::InvalidAmount(_) => ApiError::BadRequest(invalid.to_string()),
            ClaimError::Chain(e) => e.into(),
        }
    }
}

impl From<TransferError> for ApiError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::Chain(e) => e.into(),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("worker task failed: {e}"))
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub network: String,
    pub chain_id: u64,
    pub treasury_address: Address,
    pub treasury_eth_balance: f64,
    pub total_earned_eth: f64,
    pub contract_eth_balance: f64,
    pub can_withdraw: bool,
    pub earning_contracts: Vec<Address>,
    pub contract_balances: BTreeMap<Address, f64>,
    pub block_number: u64,
    pub timestamp: DateTime<Utc>,
}

/// One confirmed claim as reported to clients.
#[derive(Debug, Serialize)]
pub struct ClaimSummary {
    pub contract: Address,
    pub variant: CallVariant,
    pub amount: f64,
    pub tx: TxHash,
    pub block: u64,
}

impl From<&ClaimAttempt> for ClaimSummary {
    fn from(claim: &ClaimAttempt) -> Self {
        Self {
            contract: claim.contract,
            variant: claim.variant,
            amount: wei_to_eth(claim.amount_wei),
            tx: claim.tx_hash,
            block: claim.block_number,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EarnResponse {
    pub success: bool,
    pub actual_gained_eth: f64,
    /// Exact signed delta, as a decimal string.
    pub actual_gained_wei: String,
    pub requested_eth: f64,
    pub balance_before: f64,
    pub balance_after: f64,
    pub total_earned_eth: f64,
    pub successful_claims: Vec<ClaimSummary>,
    pub contracts_attempted: usize,
    pub contracts_succeeded: usize,
    pub reports: Vec<ContractReport>,
    pub network: String,
    pub timestamp: DateTime<Utc>,
}

impl From<ClaimResult> for EarnResponse {
    fn from(result: ClaimResult) -> Self {
        Self {
            success: true,
            actual_gained_eth: signed_wei_to_eth(result.actual_gained),
            actual_gained_wei: result.actual_gained.to_string(),
            requested_eth: wei_to_eth(result.requested_total),
            balance_before: wei_to_eth(result.balance_before),
            balance_after: wei_to_eth(result.balance_after),
            total_earned_eth: signed_wei_to_eth(result.ledger_total),
            successful_claims: result.successful_claims.iter().map(ClaimSummary::from).collect(),
            contracts_attempted: result.contracts_attempted,
            contracts_succeeded: result.contracts_succeeded(),
            network: result.chain_id.network_label(),
            reports: result.reports,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalResponse {
    pub success: bool,
    pub tx_hash: TxHash,
    pub transaction_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    pub receipt_status: bool,
    #[serde(rename = "amountETH")]
    pub amount_eth: f64,
    pub recipient_wallet: Address,
    pub treasury_address: Address,
    pub old_balance: f64,
    pub new_balance: f64,
    pub etherscan_url: String,
    pub network: String,
    pub timestamp: DateTime<Utc>,
}

impl From<TransferReceipt> for WithdrawalResponse {
    fn from(receipt: TransferReceipt) -> Self {
        Self {
            success: true,
            tx_hash: receipt.tx_hash,
            transaction_hash: receipt.tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            receipt_status: receipt.status,
            amount_eth: wei_to_eth(receipt.amount_wei),
            recipient_wallet: receipt.recipient,
            treasury_address: receipt.treasury,
            old_balance: wei_to_eth(receipt.balance_before),
            new_balance: wei_to_eth(receipt.balance_after),
            etherscan_url: format!("{EXPLORER_TX_URL}{}", receipt.tx_hash),
            network: receipt.chain_id.network_label(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingResponse {
    pub success: bool,
    pub tx_hash: TxHash,
    pub contract_address: Address,
    pub amount: f64,
    pub block_number: u64,
    pub receipt_status: bool,
    pub etherscan_url: String,
    pub network: String,
}

impl From<TransferReceipt> for FundingResponse {
    fn from(receipt: TransferReceipt) -> Self {
        Self {
            success: true,
            tx_hash: receipt.tx_hash,
            contract_address: receipt.recipient,
            amount: wei_to_eth(receipt.amount_wei),
            block_number: receipt.block_number,
            receipt_status: receipt.status,
            etherscan_url: format!("{EXPLORER_TX_URL}{}", receipt.tx_hash),
            network: receipt.chain_id.network_label(),
        }
    }
}
