//! Route handlers.
//!
//! Chain work runs on its own task so a client disconnect never cancels a
//! broadcast or a confirmation wait.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::blockchain::units::{signed_wei_to_eth, wei_to_eth};
use crate::claims::EarningEvent;
use crate::http::response::{
    ApiError, EarnResponse, FundingResponse, HealthResponse, WithdrawalResponse,
};
use crate::http::server::AppState;
use crate::lifecycle::AppContext;
use crate::transfers::service::GAS_RESERVE;
use crate::transfers::{FundingRequest, TransferKind, WithdrawalRequest};

fn context(state: &AppState) -> Result<Arc<AppContext>, ApiError> {
    state.ctx.clone().ok_or(ApiError::NotReady)
}

/// Treasury status. Reads only.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let ctx = context(&state)?;
    let chain = &ctx.chain;
    let treasury = ctx.treasury();

    let chain_id = chain.chain_id().await?;
    let balance = chain.balance(treasury).await?;
    let block_number = chain.block_number().await?;

    let mut contract_balances = BTreeMap::new();
    let mut contract_eth_balance = 0.0;
    for target in ctx.engine.targets() {
        let eth = match chain.balance(target.address).await {
            Ok(wei) => wei_to_eth(wei),
            Err(e) => {
                tracing::warn!(contract = %target.address, error = %e, "Balance read failed");
                0.0
            }
        };
        contract_eth_balance += eth;
        contract_balances.insert(target.address, eth);
    }

    Ok(Json(HealthResponse {
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        network: chain_id.network_label(),
        chain_id: chain_id.0,
        treasury_address: treasury,
        treasury_eth_balance: wei_to_eth(balance),
        total_earned_eth: signed_wei_to_eth(ctx.ledger.total()),
        contract_eth_balance,
        can_withdraw: balance > GAS_RESERVE,
        earning_contracts: ctx.engine.targets().iter().map(|t| t.address).collect(),
        contract_balances,
        block_number,
        timestamp: Utc::now(),
    }))
}

/// Record an earning event and claim against every target.
pub async fn earn(
    State(state): State<AppState>,
    payload: Result<Json<EarningEvent>, JsonRejection>,
) -> Result<Json<EarnResponse>, ApiError> {
    let ctx = context(&state)?;
    let Json(event) = payload?;

    let result = tokio::spawn(async move { ctx.engine.process(&event).await }).await??;
    Ok(Json(result.into()))
}

/// Send treasury funds to a user wallet.
pub async fn withdraw(
    State(state): State<AppState>,
    payload: Result<Json<WithdrawalRequest>, JsonRejection>,
) -> Result<Json<WithdrawalResponse>, ApiError> {
    let ctx = context(&state)?;
    let Json(request) = payload?;

    tracing::info!(
        to = %request.user_wallet,
        amount_eth = request.amount_eth,
        backup_id = ?request.backup_id,
        source = %request.source,
        "Withdrawal requested"
    );

    let receipt = tokio::spawn(async move {
        ctx.transfers
            .transfer(TransferKind::UserWithdrawal, &request.user_wallet, request.amount_eth)
            .await
    })
    .await??;
    Ok(Json(receipt.into()))
}

/// Send treasury funds to a contract.
pub async fn fund_contract(
    State(state): State<AppState>,
    payload: Result<Json<FundingRequest>, JsonRejection>,
) -> Result<Json<FundingResponse>, ApiError> {
    let ctx = context(&state)?;
    let Json(request) = payload?;

    tracing::info!(
        contract = %request.contract_address,
        amount_eth = request.amount_eth,
        "Contract funding requested"
    );

    let receipt = tokio::spawn(async move {
        ctx.transfers
            .transfer(TransferKind::ContractFunding, &request.contract_address, request.amount_eth)
            .await
    })
    .await??;
    Ok(Json(receipt.into()))
}
