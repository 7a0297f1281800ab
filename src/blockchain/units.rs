//! Conversions between decimal ether amounts and wei.
//!
//! Request payloads and responses carry ether as JSON numbers; everything
//! that touches the chain works in integer wei.

use alloy::primitives::{I256, U256};

/// Wei per ether.
pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

/// Convert a decimal ether amount to wei.
///
/// Returns `None` for negative, NaN or infinite inputs, or amounts that do
/// not fit in 128 bits of wei.
pub fn eth_to_wei(eth: f64) -> Option<U256> {
    if !eth.is_finite() || eth < 0.0 {
        return None;
    }
    let wei = eth * WEI_PER_ETH as f64;
    if wei >= u128::MAX as f64 {
        return None;
    }
    Some(U256::from(wei.round() as u128))
}

/// Convert wei to decimal ether for display.
pub fn wei_to_eth(wei: U256) -> f64 {
    let whole = wei / U256::from(WEI_PER_ETH);
    let frac = wei % U256::from(WEI_PER_ETH);
    let whole = whole.saturating_to::<u128>();
    let frac = frac.saturating_to::<u128>();
    whole as f64 + frac as f64 / WEI_PER_ETH as f64
}

/// Convert a signed wei delta to decimal ether for display.
pub fn signed_wei_to_eth(wei: I256) -> f64 {
    let magnitude = wei_to_eth(wei.unsigned_abs());
    if wei.is_negative() {
        -magnitude
    } else {
        magnitude
    }
}

/// Signed difference `after - before`.
pub fn signed_delta(before: U256, after: U256) -> I256 {
    if after >= before {
        I256::from_raw(after - before)
    } else {
        -I256::from_raw(before - after)
    }
}
