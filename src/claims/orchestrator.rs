//! Claim orchestration for one earning event.
//!
//! # Flow
//! ```text
//! read treasury balance (before)
//!   for each target, in order:
//!     read contract balance ── dust? ──▶ skip
//!     size claim            ── dust? ──▶ skip
//!     fallback chain        ── none accepted? ──▶ skip
//!     wait for receipt      ── timeout ──▶ abort the whole run
//!                           ── reverted ──▶ skip
//!                           ── success ──▶ record claim
//! read treasury balance (after)
//! ledger += after - before
//! ```
//!
//! One contract's failure never stops the others. Only the observed balance
//! delta reaches the ledger; sized amounts are informational.

use alloy::primitives::U256;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::blockchain::transaction::TxSubmitter;
use crate::blockchain::units::{signed_delta, signed_wei_to_eth, wei_to_eth};
use crate::claims::ledger::SettlementLedger;
use crate::claims::sizing::{size_claim, Sizing};
use crate::claims::targets::TargetContract;
use crate::claims::types::{
    ClaimAttempt, ClaimError, ClaimResult, ContractOutcome, ContractReport, EarningEvent,
};
use crate::claims::variants::run_fallback_chain;
use crate::observability::metrics;

/// Drives earning events against the configured targets.
pub struct ClaimEngine {
    submitter: Arc<TxSubmitter>,
    ledger: Arc<SettlementLedger>,
    targets: Vec<TargetContract>,
    eth_price_usd: f64,
    confirmation_timeout_secs: u64,
    /// Serializes runs so each balance delta belongs to exactly one event.
    run_lock: Mutex<()>,
}

impl ClaimEngine {
    pub fn new(
        submitter: Arc<TxSubmitter>,
        ledger: Arc<SettlementLedger>,
        targets: Vec<TargetContract>,
        eth_price_usd: f64,
        confirmation_timeout_secs: u64,
    ) -> Self {
        Self {
            submitter,
            ledger,
            targets,
            eth_price_usd,
            confirmation_timeout_secs,
            run_lock: Mutex::new(()),
        }
    }

    pub fn targets(&self) -> &[TargetContract] {
        &self.targets
    }

    pub fn ledger(&self) -> &SettlementLedger {
        &self.ledger
    }

    /// Process one earning event end to end.
    pub async fn process(&self, event: &EarningEvent) -> Result<ClaimResult, ClaimError> {
        let requested_total = event.requested_total(self.eth_price_usd)?;
        let chain = self.submitter.chain();
        let treasury = self.submitter.address();

        let _run = self.run_lock.lock().await;

        let chain_id = chain.chain_id().await?;
        if !chain_id.is_mainnet() {
            tracing::warn!(chain_id = chain_id.0, "Claim run on a non-mainnet chain");
        }

        tracing::info!(
            requested_eth = wei_to_eth(requested_total),
            source = %event.source,
            user_id = event.user_id.as_deref().unwrap_or("-"),
            hourly_rate = event.hourly_rate,
            network = %chain_id.network_label(),
            "Earning event received"
        );

        let balance_before = chain.balance(treasury).await?;
        let mut reports = Vec::with_capacity(self.targets.len());

        for target in &self.targets {
            let report = self.claim_from(target, requested_total).await?;
            reports.push(report);
        }

        let balance_after = chain.balance(treasury).await?;
        let actual_gained = signed_delta(balance_before, balance_after);
        let ledger_total = self.ledger.record(actual_gained);

        let successful_claims: Vec<ClaimAttempt> = reports
            .iter()
            .filter_map(|r| match &r.outcome {
                ContractOutcome::Claimed { claim, .. } => Some(claim.clone()),
                _ => None,
            })
            .collect();

        metrics::record_claim_run(successful_claims.len());
        tracing::info!(
            actual_gained_eth = signed_wei_to_eth(actual_gained),
            balance_before_eth = wei_to_eth(balance_before),
            balance_after_eth = wei_to_eth(balance_after),
            ledger_total_eth = signed_wei_to_eth(ledger_total),
            successful_claims = successful_claims.len(),
            "Claim run complete"
        );

        Ok(ClaimResult {
            requested_total,
            balance_before,
            balance_after,
            actual_gained,
            ledger_total,
            successful_claims,
            reports,
            contracts_attempted: self.targets.len(),
            chain_id,
        })
    }

    /// Run sizing, the fallback chain and confirmation for one target.
    ///
    /// Only a confirmation timeout escapes as an error.
    async fn claim_from(
        &self,
        target: &TargetContract,
        requested_total: U256,
    ) -> Result<ContractReport, ClaimError> {
        let contract = target.address;

        let balance = match self.submitter.chain().balance(contract).await {
            Ok(balance) => balance,
            Err(e) => {
                tracing::warn!(contract = %contract, error = %e, "Contract balance unavailable");
                return Ok(ContractReport {
                    contract,
                    balance_wei: None,
                    outcome: ContractOutcome::Unreadable { error: e.to_string() },
                });
            }
        };

        let report = |outcome| ContractReport {
            contract,
            balance_wei: Some(balance),
            outcome,
        };

        let amount = match size_claim(requested_total, self.targets.len(), balance) {
            Sizing::Claim(amount) => amount,
            Sizing::Skip(reason) => {
                tracing::info!(
                    contract = %contract,
                    balance_eth = wei_to_eth(balance),
                    reason = ?reason,
                    "Contract skipped"
                );
                return Ok(report(ContractOutcome::Skipped { reason }));
            }
        };

        tracing::info!(
            contract = %contract,
            claim_eth = wei_to_eth(amount),
            "Claiming from contract"
        );

        let fallback = run_fallback_chain(&self.submitter, target, amount).await;
        let Some((variant, tx_hash)) = fallback.submitted() else {
            tracing::info!(contract = %contract, "No withdrawal variant accepted");
            return Ok(report(ContractOutcome::Exhausted {
                attempts: fallback.attempts,
            }));
        };

        let receipt = self
            .submitter
            .wait_for_receipt(tx_hash, self.confirmation_timeout_secs)
            .await?;

        if !receipt.status {
            tracing::warn!(
                contract = %contract,
                tx_hash = %tx_hash,
                block = receipt.block_number,
                "Claim transaction reverted"
            );
            return Ok(report(ContractOutcome::Reverted {
                attempts: fallback.attempts,
                tx_hash,
                block_number: receipt.block_number,
            }));
        }

        tracing::info!(
            contract = %contract,
            claim_eth = wei_to_eth(amount),
            block = receipt.block_number,
            "Claim confirmed"
        );
        Ok(report(ContractOutcome::Claimed {
            attempts: fallback.attempts,
            claim: ClaimAttempt {
                contract,
                variant,
                amount_wei: amount,
                tx_hash,
                block_number: receipt.block_number,
            },
        }))
    }
}
