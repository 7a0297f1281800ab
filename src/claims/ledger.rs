//! Settlement ledger: process-lifetime total of observed net gain.
//!
//! Only the claim engine writes to it, and only with a measured treasury
//! balance delta. The total may go negative when gas outweighs claims.
//! Nothing is persisted; a restart starts from zero.

use alloy::primitives::I256;
use std::sync::Mutex;

use crate::blockchain::units::signed_wei_to_eth;
use crate::observability::metrics;

#[derive(Debug, Default)]
pub struct SettlementLedger {
    total_wei: Mutex<I256>,
}

impl SettlementLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observed delta and return the new total.
    pub fn record(&self, delta_wei: I256) -> I256 {
        let mut total = self.total_wei.lock().unwrap_or_else(|e| e.into_inner());
        *total = total.saturating_add(delta_wei);
        metrics::set_ledger_total(signed_wei_to_eth(*total));
        *total
    }

    pub fn total(&self) -> I256 {
        *self.total_wei.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn total_eth(&self) -> f64 {
        signed_wei_to_eth(self.total())
    }
}
