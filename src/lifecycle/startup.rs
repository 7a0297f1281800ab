//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the treasury key and connect the RPC client
//! - Build the submission lane, claim engine and transfer service once
//! - Probe the chain and log what the treasury can see
//!
//! # Design Decisions
//! - Never fatal: a bad key, URL or unreachable node leaves the service
//!   running without a context, and chain endpoints answer 503
//! - The context is built before the listener is bound

use alloy::primitives::Address;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::blockchain::units::wei_to_eth;
use crate::blockchain::{BlockchainError, ChainClient, RpcChainClient, TxSubmitter, Wallet};
use crate::claims::{default_targets, ClaimEngine, SettlementLedger, TargetContract};
use crate::config::validation::{validate_rpc_url, ValidationError};
use crate::config::TreasuryConfig;
use crate::transfers::TransferService;

/// Everything a request handler needs, constructed once per process.
pub struct AppContext {
    pub chain: Arc<dyn ChainClient>,
    pub submitter: Arc<TxSubmitter>,
    pub engine: ClaimEngine,
    pub transfers: TransferService,
    pub ledger: Arc<SettlementLedger>,
}

impl AppContext {
    /// Wire a context around an existing chain client and wallet.
    pub fn from_parts(
        chain: Arc<dyn ChainClient>,
        wallet: Wallet,
        targets: Vec<TargetContract>,
        config: &TreasuryConfig,
    ) -> Self {
        let poll_interval = Duration::from_millis(config.blockchain.receipt_poll_interval_ms);
        let confirmation_timeout = config.blockchain.confirmation_timeout_secs;

        let submitter = Arc::new(TxSubmitter::new(chain.clone(), wallet, poll_interval));
        let ledger = Arc::new(SettlementLedger::new());
        let engine = ClaimEngine::new(
            submitter.clone(),
            ledger.clone(),
            targets,
            config.pricing.eth_price_usd,
            confirmation_timeout,
        );
        let transfers = TransferService::new(submitter.clone(), confirmation_timeout);

        Self {
            chain,
            submitter,
            engine,
            transfers,
            ledger,
        }
    }

    pub fn treasury(&self) -> Address {
        self.submitter.address()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ValidationError),

    #[error(transparent)]
    Chain(#[from] BlockchainError),
}

/// Build the context from configuration and the key in the environment.
pub async fn build_context(config: &TreasuryConfig) -> Result<AppContext, StartupError> {
    validate_rpc_url(&config.blockchain.rpc_url)?;
    let wallet = Wallet::from_env()?;
    let chain: Arc<dyn ChainClient> = Arc::new(RpcChainClient::new(config.blockchain.clone())?);

    let ctx = AppContext::from_parts(chain, wallet, default_targets(), config);
    probe(&ctx, config.blockchain.expected_chain_id).await?;
    Ok(ctx)
}

/// Build the context, or log why not and return `None`.
pub async fn initialize(config: &TreasuryConfig) -> Option<Arc<AppContext>> {
    match build_context(config).await {
        Ok(ctx) => Some(Arc::new(ctx)),
        Err(e) => {
            tracing::error!(error = %e, "Treasury not initialized, serving in degraded mode");
            None
        }
    }
}

/// Check the node answers and log the treasury's view of the chain.
///
/// Only the chain id and treasury balance reads can fail the probe; target
/// reads are informational.
pub async fn probe(ctx: &AppContext, expected_chain_id: Option<u64>) -> Result<(), BlockchainError> {
    let chain_id = ctx.chain.chain_id().await?;
    if let Some(expected) = expected_chain_id {
        if chain_id.0 != expected {
            tracing::warn!(expected, actual = chain_id.0, "Unexpected chain id");
        }
    }
    if !chain_id.is_mainnet() {
        tracing::warn!(network = %chain_id.network_label(), "Not connected to mainnet");
    }

    let treasury = ctx.treasury();
    let balance = ctx.chain.balance(treasury).await?;
    tracing::info!(
        treasury = %treasury,
        balance_eth = wei_to_eth(balance),
        network = %chain_id.network_label(),
        "Treasury connected"
    );

    for target in ctx.engine.targets() {
        let balance = ctx.chain.balance(target.address).await;
        let code = ctx.chain.code(target.address).await;
        match (balance, code) {
            (Ok(balance), Ok(code)) => tracing::info!(
                contract = %target.address,
                balance_eth = wei_to_eth(balance),
                has_code = !code.is_empty(),
                "Target contract"
            ),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(contract = %target.address, error = %e, "Target probe failed")
            }
        }
    }

    Ok(())
}
