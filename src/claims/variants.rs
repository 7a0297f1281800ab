//! Withdrawal call shapes and the fallback chain that probes them.
//!
//! The service cannot tell which withdrawal ABI a target implements, so it
//! tries each known shape in a fixed order and stops at the first one the
//! node accepts. A variant that fails to build, sign or broadcast is an
//! expected miss, recorded in the attempt log and never surfaced as an
//! error. Whether the accepted call actually paid out is decided later by
//! its receipt.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use serde::Serialize;

use crate::blockchain::transaction::{CallRequest, TxSubmitter};
use crate::claims::targets::TargetContract;
use crate::observability::metrics;

sol! {
    /// Withdrawal entry points a target contract may expose.
    interface IWithdrawable {
        function withdrawTo(address to, uint256 amount) external;
        function withdraw(uint256 amount) external;
        function claim() external;
    }
}

/// Gas limit for every withdrawal call.
pub const CLAIM_GAS_LIMIT: u64 = 100_000;

/// One candidate withdrawal call shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CallVariant {
    /// `withdrawTo(treasury, amount)`
    WithdrawTo,
    /// `withdraw(amount)`
    Withdraw,
    /// `claim()`; ignores the sized amount.
    Claim,
}

impl CallVariant {
    /// Order in which variants are tried.
    pub const FALLBACK_ORDER: [CallVariant; 3] =
        [CallVariant::WithdrawTo, CallVariant::Withdraw, CallVariant::Claim];

    pub fn name(&self) -> &'static str {
        match self {
            CallVariant::WithdrawTo => "withdrawTo",
            CallVariant::Withdraw => "withdraw",
            CallVariant::Claim => "claim",
        }
    }

    pub fn selector(&self) -> [u8; 4] {
        match self {
            CallVariant::WithdrawTo => IWithdrawable::withdrawToCall::SELECTOR,
            CallVariant::Withdraw => IWithdrawable::withdrawCall::SELECTOR,
            CallVariant::Claim => IWithdrawable::claimCall::SELECTOR,
        }
    }

    /// ABI-encode the call paying `amount` to `recipient`.
    pub fn encode(&self, recipient: Address, amount: U256) -> Bytes {
        let data = match self {
            CallVariant::WithdrawTo => IWithdrawable::withdrawToCall { to: recipient, amount }.abi_encode(),
            CallVariant::Withdraw => IWithdrawable::withdrawCall { amount }.abi_encode(),
            CallVariant::Claim => IWithdrawable::claimCall {}.abi_encode(),
        };
        data.into()
    }
}

/// What happened to one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum VariantOutcome {
    /// The node accepted the transaction.
    Submitted(TxHash),
    /// Build, signing or broadcast failed.
    Rejected(String),
}

/// One entry of the attempt log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantAttempt {
    pub variant: CallVariant,
    pub outcome: VariantOutcome,
}

/// Attempt log for one contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FallbackOutcome {
    pub attempts: Vec<VariantAttempt>,
}

impl FallbackOutcome {
    /// The variant that matched and its transaction, if any.
    pub fn submitted(&self) -> Option<(CallVariant, TxHash)> {
        self.attempts.iter().find_map(|a| match a.outcome {
            VariantOutcome::Submitted(hash) => Some((a.variant, hash)),
            VariantOutcome::Rejected(_) => None,
        })
    }
}

/// Try the target's variants in [`CallVariant::FALLBACK_ORDER`] until one is
/// accepted.
pub async fn run_fallback_chain(
    submitter: &TxSubmitter,
    target: &TargetContract,
    amount: U256,
) -> FallbackOutcome {
    let recipient = submitter.address();
    let mut outcome = FallbackOutcome::default();

    for variant in CallVariant::FALLBACK_ORDER
        .into_iter()
        .filter(|v| target.supports(*v))
    {
        let call = CallRequest::contract_call(
            target.address,
            variant.encode(recipient, amount),
            CLAIM_GAS_LIMIT,
        );

        match submitter.submit(call).await {
            Ok(tx_hash) => {
                tracing::info!(
                    contract = %target.address,
                    variant = variant.name(),
                    tx_hash = %tx_hash,
                    "Claim transaction submitted"
                );
                metrics::record_claim_attempt(variant.name(), "submitted");
                outcome.attempts.push(VariantAttempt {
                    variant,
                    outcome: VariantOutcome::Submitted(tx_hash),
                });
                break;
            }
            Err(e) => {
                let reason: String = e.to_string().chars().take(200).collect();
                tracing::info!(
                    contract = %target.address,
                    variant = variant.name(),
                    reason = %reason,
                    "Claim variant not accepted"
                );
                metrics::record_claim_attempt(variant.name(), "rejected");
                outcome.attempts.push(VariantAttempt {
                    variant,
                    outcome: VariantOutcome::Rejected(reason),
                });
            }
        }
    }

    outcome
}
