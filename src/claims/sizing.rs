//! Per-contract claim sizing.
//!
//! ```text
//! claim = min(requested / N, balance / 10, 0.01 ETH)
//! ```
//!
//! `N` is the number of configured targets, not the number that end up
//! being claimed from: a skipped contract's share is not redistributed.
//! Contracts whose balance, or whose computed claim, falls under the dust
//! floor are skipped.

use alloy::primitives::U256;
use serde::Serialize;

/// Largest amount taken from one contract per event (0.01 ETH).
pub const HARD_CAP_PER_CONTRACT: U256 = U256::from_limbs([10_000_000_000_000_000, 0, 0, 0]);

/// Balances and claims below this are ignored (0.0001 ETH).
pub const DUST_FLOOR: U256 = U256::from_limbs([100_000_000_000_000, 0, 0, 0]);

/// At most a tenth of a contract's balance is claimed.
pub const BALANCE_SHARE_DIVISOR: u64 = 10;

/// Why a contract received no attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Contract balance under the dust floor.
    BalanceBelowFloor,
    /// Computed claim under the dust floor.
    ClaimBelowFloor,
}

/// Sizing verdict for one contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sizing {
    Claim(U256),
    Skip(SkipReason),
}

/// Even share of the requested total per configured target.
pub fn nominal_share(requested_total: U256, target_count: usize) -> U256 {
    if target_count == 0 {
        return U256::ZERO;
    }
    requested_total / U256::from(target_count)
}

/// Size the claim against one contract.
pub fn size_claim(requested_total: U256, target_count: usize, contract_balance: U256) -> Sizing {
    if contract_balance < DUST_FLOOR {
        return Sizing::Skip(SkipReason::BalanceBelowFloor);
    }

    let claim = nominal_share(requested_total, target_count)
        .min(contract_balance / U256::from(BALANCE_SHARE_DIVISOR))
        .min(HARD_CAP_PER_CONTRACT);

    if claim < DUST_FLOOR {
        Sizing::Skip(SkipReason::ClaimBelowFloor)
    } else {
        Sizing::Claim(claim)
    }
}
