//! Direct transfer service: withdrawals to users and contract funding.

pub mod service;
pub mod types;

pub use service::TransferService;
pub use types::{FundingRequest, TransferError, TransferKind, TransferReceipt, WithdrawalRequest};
