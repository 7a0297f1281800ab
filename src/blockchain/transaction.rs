//! Transaction building, signing, and confirmation monitoring.
//!
//! # Responsibilities
//! - Build legacy transactions with the network's suggested gas price
//! - Issue nonces for the treasury account without collisions
//! - Sign and broadcast transactions
//! - Poll for receipts under a deadline

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, TxReceipt};
use crate::blockchain::wallet::Wallet;

/// Gas limit for a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Unsigned call descriptor handed to the submitter.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub gas_limit: u64,
}

impl CallRequest {
    /// Plain native-currency transfer.
    pub fn transfer(to: Address, value: U256) -> Self {
        Self {
            to,
            value,
            data: Bytes::new(),
            gas_limit: TRANSFER_GAS_LIMIT,
        }
    }

    /// Contract call carrying no value.
    pub fn contract_call(to: Address, data: Bytes, gas_limit: u64) -> Self {
        Self {
            to,
            value: U256::ZERO,
            data,
            gas_limit,
        }
    }
}

/// Single submission lane for the treasury account.
///
/// The lane lock is held from nonce selection through broadcast, so two
/// requests can never sign with the same nonce. The local counter only moves
/// after the node accepted a transaction.
pub struct TxSubmitter {
    chain: Arc<dyn ChainClient>,
    wallet: Wallet,
    /// Next nonce this process would issue, once anything was broadcast.
    lane: Mutex<Option<u64>>,
    poll_interval: Duration,
}

impl TxSubmitter {
    pub fn new(chain: Arc<dyn ChainClient>, wallet: Wallet, poll_interval: Duration) -> Self {
        Self {
            chain,
            wallet,
            lane: Mutex::new(None),
            poll_interval,
        }
    }

    /// Build, sign and broadcast `call` from the treasury account.
    pub async fn submit(&self, call: CallRequest) -> BlockchainResult<TxHash> {
        let mut lane = self.lane.lock().await;

        let chain_nonce = self.chain.transaction_count(self.wallet.address()).await?;
        let nonce = lane.map_or(chain_nonce, |local| local.max(chain_nonce));
        let gas_price = self.chain.gas_price().await?;
        let chain_id = self.chain.chain_id().await?;

        let tx = TransactionRequest::default()
            .with_to(call.to)
            .with_value(call.value)
            .with_input(call.data)
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_chain_id(chain_id.0)
            .with_gas_limit(call.gas_limit);

        let raw = self.wallet.sign_transaction(tx).await?;
        let tx_hash = self.chain.send_raw_transaction(raw).await?;
        *lane = Some(nonce + 1);

        tracing::debug!(
            tx_hash = %tx_hash,
            to = %call.to,
            nonce,
            gas_price,
            "Transaction broadcast"
        );
        Ok(tx_hash)
    }

    /// Wait until the node reports a receipt for `tx_hash`.
    ///
    /// Gives up with [`BlockchainError::ConfirmationTimeout`] after
    /// `timeout_secs`; the transaction itself stays in flight.
    pub async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout_secs: u64,
    ) -> BlockchainResult<TxReceipt> {
        let result = timeout(Duration::from_secs(timeout_secs), async {
            let mut ticker = interval(self.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                // Poll errors are transient until the deadline
                match self.chain.transaction_receipt(tx_hash).await {
                    Ok(Some(receipt)) => return receipt,
                    Ok(None) => tracing::debug!(tx_hash = %tx_hash, "Transaction pending"),
                    Err(e) => tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt poll failed"),
                }
            }
        })
        .await;

        match result {
            Ok(receipt) => Ok(receipt),
            Err(_) => Err(BlockchainError::ConfirmationTimeout {
                tx_hash,
                timeout_secs,
            }),
        }
    }

    /// Get the wallet address.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn chain(&self) -> &Arc<dyn ChainClient> {
        &self.chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock::{MockChain, TEST_PRIVATE_KEY};
    use alloy::consensus::{Transaction, TxEnvelope};
    use alloy::eips::eip2718::Decodable2718;

    fn submitter(chain: Arc<MockChain>) -> TxSubmitter {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        TxSubmitter::new(chain, wallet, Duration::from_millis(10))
    }

    fn decode(raw: &Bytes) -> TxEnvelope {
        TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap()
    }

    #[tokio::test]
    async fn test_transfer_fields() {
        let chain = Arc::new(MockChain::new(31337));
        chain.set_gas_price(7_000_000_000);
        let submitter = submitter(chain.clone());

        let to = Address::repeat_byte(0x42);
        submitter.submit(CallRequest::transfer(to, U256::from(5u64))).await.unwrap();

        let sent = chain.sent_transactions();
        assert_eq!(sent.len(), 1);
        let tx = decode(&sent[0]);
        assert_eq!(tx.to(), Some(to));
        assert_eq!(tx.value(), U256::from(5u64));
        assert_eq!(tx.gas_limit(), TRANSFER_GAS_LIMIT);
        assert_eq!(tx.gas_price(), Some(7_000_000_000));
        assert_eq!(tx.chain_id(), Some(31337));
        assert_eq!(tx.nonce(), 0);
    }

    #[tokio::test]
    async fn test_nonces_do_not_collide() {
        let chain = Arc::new(MockChain::new(31337));
        // Node keeps reporting the mined count while our transactions are pending
        chain.freeze_transaction_count(true);
        let submitter = Arc::new(submitter(chain.clone()));

        let mut handles = Vec::new();
        for i in 0..5u8 {
            let s = submitter.clone();
            handles.push(tokio::spawn(async move {
                s.submit(CallRequest::transfer(Address::repeat_byte(i + 1), U256::from(1u64)))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut nonces: Vec<u64> = chain
            .sent_transactions()
            .iter()
            .map(|raw| decode(raw).nonce())
            .collect();
        nonces.sort_unstable();
        assert_eq!(nonces, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_rejected_broadcast_keeps_nonce() {
        let chain = Arc::new(MockChain::new(31337));
        chain.freeze_transaction_count(true);
        let submitter = submitter(chain.clone());

        chain.reject_next_broadcast("nonce too low");
        let first = submitter
            .submit(CallRequest::transfer(Address::repeat_byte(1), U256::from(1u64)))
            .await;
        assert!(matches!(first, Err(BlockchainError::Rejected(_))));

        submitter
            .submit(CallRequest::transfer(Address::repeat_byte(1), U256::from(1u64)))
            .await
            .unwrap();
        assert_eq!(decode(&chain.sent_transactions()[0]).nonce(), 0);
    }

    #[tokio::test]
    async fn test_wait_for_receipt() {
        let chain = Arc::new(MockChain::new(31337));
        let submitter = submitter(chain.clone());
        let hash = submitter
            .submit(CallRequest::transfer(Address::repeat_byte(9), U256::from(1u64)))
            .await
            .unwrap();

        let receipt = submitter.wait_for_receipt(hash, 5).await.unwrap();
        assert!(receipt.status);
        assert_eq!(receipt.tx_hash, hash);
        assert_eq!(receipt.gas_used, TRANSFER_GAS_LIMIT);
    }

    #[tokio::test]
    async fn test_wait_for_receipt_timeout() {
        let chain = Arc::new(MockChain::new(31337));
        chain.withhold_receipts(true);
        let submitter = submitter(chain.clone());
        let hash = submitter
            .submit(CallRequest::transfer(Address::repeat_byte(9), U256::from(1u64)))
            .await
            .unwrap();

        let err = submitter.wait_for_receipt(hash, 1).await.unwrap_err();
        assert!(matches!(err, BlockchainError::ConfirmationTimeout { .. }));
    }
}
