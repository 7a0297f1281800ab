//! Compiled-in list of target contracts.

use alloy::primitives::{address, Address};
use serde::Serialize;

use crate::claims::variants::CallVariant;

/// Contracts the engine claims from, in processing order.
pub const TARGET_CONTRACTS: [Address; 3] = [
    address!("29983BE497D4c1D39Aa80D20Cf74173ae81D2af5"),
    address!("0b8Add0d32eFaF79E6DB4C58CcA61D6eFBCcAa3D"),
    address!("f97A395850304b8ec9B8f9c80A17674886612065"),
];

/// A contract plus the withdrawal shapes it is believed to expose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetContract {
    pub address: Address,
    pub variants: Vec<CallVariant>,
}

impl TargetContract {
    /// Target believed to expose every known variant.
    pub fn new(address: Address) -> Self {
        Self::with_variants(address, &CallVariant::FALLBACK_ORDER)
    }

    pub fn with_variants(address: Address, variants: &[CallVariant]) -> Self {
        Self {
            address,
            variants: variants.to_vec(),
        }
    }

    pub fn supports(&self, variant: CallVariant) -> bool {
        self.variants.contains(&variant)
    }
}

/// The configured targets.
pub fn default_targets() -> Vec<TargetContract> {
    TARGET_CONTRACTS.into_iter().map(TargetContract::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_targets() {
        let targets = default_targets();
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0].address, TARGET_CONTRACTS[0]);
        assert!(targets.iter().all(|t| t.supports(CallVariant::Claim)));
    }
}
