//! Claim orchestration and settlement engine.
//!
//! # Data Flow
//! ```text
//! EarningEvent
//!     → sizing.rs (per-contract claim amount, dust rules)
//!     → variants.rs (withdrawTo → withdraw → claim fallback chain)
//!     → blockchain::TxSubmitter (sign, broadcast, confirm)
//!     → ledger.rs (accumulate observed balance delta)
//!     → ClaimResult
//! ```
//!
//! # Design Decisions
//! - Targets and call shapes are compiled in, not configurable
//! - Partial success is the norm: one contract never aborts the run
//! - A confirmation timeout aborts the request; nothing is rolled back

pub mod ledger;
pub mod orchestrator;
pub mod sizing;
pub mod targets;
pub mod types;
pub mod variants;

pub use ledger::SettlementLedger;
pub use orchestrator::ClaimEngine;
pub use targets::{default_targets, TargetContract};
pub use types::{ClaimAttempt, ClaimError, ClaimResult, ContractOutcome, EarningEvent};
pub use variants::CallVariant;
