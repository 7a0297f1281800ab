//! In-memory chain used by unit and integration tests.
//!
//! Decodes every broadcast transaction, applies its value and gas effects to
//! local balances, and hands out receipts immediately. Contracts can be told
//! to refuse a selector at broadcast time, to revert it on-chain, or to pay
//! the caller when a call succeeds.

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{address, Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, TxReceipt};

/// Anvil's first development key. Publicly known; never holds real funds.
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Address derived from [`TEST_PRIVATE_KEY`].
pub const TEST_TREASURY: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

/// A decoded transaction as the mock received it.
#[derive(Debug, Clone)]
pub struct SentCall {
    pub tx_hash: TxHash,
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    pub nonce: u64,
    pub gas_limit: u64,
}

impl SentCall {
    /// First four bytes of the calldata.
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.input.get(..4).and_then(|s| s.try_into().ok())
    }
}

#[derive(Default)]
struct State {
    block_number: u64,
    gas_price: u128,
    mined_count: u64,
    freeze_count: bool,
    withhold_receipts: bool,
    balances: HashMap<Address, U256>,
    code: HashMap<Address, Bytes>,
    refused: HashSet<(Address, [u8; 4])>,
    reverting: HashSet<(Address, [u8; 4])>,
    payouts: HashMap<Address, U256>,
    reject_next: Option<String>,
    receipts: HashMap<TxHash, TxReceipt>,
    raw: Vec<Bytes>,
    sent: Vec<SentCall>,
    balance_reads: u64,
}

/// Scriptable [`ChainClient`].
pub struct MockChain {
    chain_id: u64,
    treasury: Address,
    state: Mutex<State>,
}

impl MockChain {
    pub fn new(chain_id: u64) -> Self {
        Self::with_treasury(chain_id, TEST_TREASURY)
    }

    /// Mock whose broadcasts are all treated as sent by `treasury`.
    pub fn with_treasury(chain_id: u64, treasury: Address) -> Self {
        Self {
            chain_id,
            treasury,
            state: Mutex::new(State {
                block_number: 100,
                gas_price: 1_000_000_000,
                ..Default::default()
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_balance(&self, address: Address, wei: U256) {
        self.state().balances.insert(address, wei);
    }

    pub fn balance_of(&self, address: Address) -> U256 {
        self.state().balances.get(&address).copied().unwrap_or_default()
    }

    pub fn set_code(&self, address: Address, code: Bytes) {
        self.state().code.insert(address, code);
    }

    pub fn set_gas_price(&self, wei: u128) {
        self.state().gas_price = wei;
    }

    /// Keep reporting the same transaction count regardless of broadcasts.
    pub fn freeze_transaction_count(&self, frozen: bool) {
        self.state().freeze_count = frozen;
    }

    /// Never produce receipts (simulates a stuck transaction).
    pub fn withhold_receipts(&self, withhold: bool) {
        self.state().withhold_receipts = withhold;
    }

    /// Refuse broadcasts of `selector` to `contract`.
    pub fn refuse_selector(&self, contract: Address, selector: [u8; 4]) {
        self.state().refused.insert((contract, selector));
    }

    /// Accept `selector` to `contract` but revert it on-chain.
    pub fn revert_selector(&self, contract: Address, selector: [u8; 4]) {
        self.state().reverting.insert((contract, selector));
    }

    /// Pay `wei` from `contract` to the caller on every successful call.
    pub fn set_payout(&self, contract: Address, wei: U256) {
        self.state().payouts.insert(contract, wei);
    }

    /// Fail the next broadcast with `reason`.
    pub fn reject_next_broadcast(&self, reason: &str) {
        self.state().reject_next = Some(reason.to_string());
    }

    pub fn sent_transactions(&self) -> Vec<Bytes> {
        self.state().raw.clone()
    }

    pub fn sent_calls(&self) -> Vec<SentCall> {
        self.state().sent.clone()
    }

    /// Number of `eth_getBalance` calls served.
    pub fn balance_reads(&self) -> u64 {
        self.state().balance_reads
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        Ok(ChainId(self.chain_id))
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        Ok(self.state().block_number)
    }

    async fn balance(&self, address: Address) -> BlockchainResult<U256> {
        let mut state = self.state();
        state.balance_reads += 1;
        Ok(state.balances.get(&address).copied().unwrap_or_default())
    }

    async fn code(&self, address: Address) -> BlockchainResult<Bytes> {
        Ok(self.state().code.get(&address).cloned().unwrap_or_default())
    }

    async fn transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        let state = self.state();
        if address != self.treasury || state.freeze_count {
            return Ok(0);
        }
        Ok(state.mined_count)
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        Ok(self.state().gas_price)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash> {
        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref())
            .map_err(|e| BlockchainError::Rejected(format!("undecodable transaction: {e}")))?;

        let mut state = self.state();
        if let Some(reason) = state.reject_next.take() {
            return Err(BlockchainError::Rejected(reason));
        }

        let call = SentCall {
            tx_hash: *envelope.tx_hash(),
            to: envelope.to(),
            value: envelope.value(),
            input: envelope.input().clone(),
            nonce: envelope.nonce(),
            gas_limit: envelope.gas_limit(),
        };
        let key = call.to.zip(call.selector());

        if key.is_some_and(|k| state.refused.contains(&k)) {
            return Err(BlockchainError::Rejected("execution reverted: unknown selector".to_string()));
        }

        let status = !key.is_some_and(|k| state.reverting.contains(&k));
        let gas_used = call.gas_limit;
        let fee = U256::from(gas_used) * U256::from(envelope.gas_price().unwrap_or_default());

        let treasury = self.treasury;
        let sender = state.balances.entry(treasury).or_default();
        *sender = sender.saturating_sub(fee);

        if status {
            if let Some(to) = call.to {
                let sender = state.balances.entry(treasury).or_default();
                *sender = sender.saturating_sub(call.value);
                *state.balances.entry(to).or_default() += call.value;

                if let Some(payout) = state.payouts.get(&to).copied() {
                    let contract = state.balances.entry(to).or_default();
                    let paid = payout.min(*contract);
                    *contract -= paid;
                    *state.balances.entry(treasury).or_default() += paid;
                }
            }
        }

        state.block_number += 1;
        if !state.freeze_count {
            state.mined_count += 1;
        }
        let receipt = TxReceipt {
            tx_hash: call.tx_hash,
            status,
            block_number: state.block_number,
            gas_used,
        };
        state.receipts.insert(call.tx_hash, receipt);
        state.raw.push(raw);
        let tx_hash = call.tx_hash;
        state.sent.push(call);
        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<TxReceipt>> {
        let state = self.state();
        if state.withhold_receipts {
            return Ok(None);
        }
        Ok(state.receipts.get(&tx_hash).copied())
    }
}
