//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoint
//! - Query chain state (chain id, block number, balances, code, nonce, gas price)
//! - Broadcast signed transactions and fetch receipts
//! - Handle timeouts and network errors gracefully

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use async_trait::async_trait;
use std::fmt::Display;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId, TxReceipt};

/// Read and broadcast surface of the node the treasury talks to.
///
/// Handlers and the claim engine only ever see this trait, so tests can run
/// the whole service against an in-memory chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> BlockchainResult<ChainId>;

    async fn block_number(&self) -> BlockchainResult<u64>;

    async fn balance(&self, address: Address) -> BlockchainResult<U256>;

    /// Deployed bytecode at `address` (empty for externally owned accounts).
    async fn code(&self, address: Address) -> BlockchainResult<Bytes>;

    /// Number of transactions sent from `address` (its next nonce).
    async fn transaction_count(&self, address: Address) -> BlockchainResult<u64>;

    /// Suggested legacy gas price in wei.
    async fn gas_price(&self) -> BlockchainResult<u128>;

    /// Broadcast a signed, EIP-2718 encoded transaction.
    async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash>;

    /// Receipt for `tx_hash`, or `None` while still pending.
    async fn transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<TxReceipt>>;
}

/// JSON-RPC backed [`ChainClient`].
#[derive(Clone)]
pub struct RpcChainClient {
    provider: Arc<dyn Provider + Send + Sync>,
    config: BlockchainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl RpcChainClient {
    /// Create a new RPC client.
    ///
    /// No network traffic happens here; reachability is checked by the
    /// startup probe.
    pub fn new(config: BlockchainConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);

        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", redact_url(&config.rpc_url), e))
        })?;
        let provider = Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>;

        tracing::info!(
            rpc_url = %redact_url(&config.rpc_url),
            timeout_secs = config.rpc_timeout_secs,
            "RPC client initialized"
        );

        Ok(Self {
            provider,
            config,
            timeout_duration,
        })
    }

    /// Run one RPC round-trip under the configured timeout.
    async fn call<T, E, F>(&self, op: &'static str, fut: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => {
                tracing::warn!(op, error = %e, "RPC error");
                Err(BlockchainError::Rpc(format!("{op}: {e}")))
            }
            Err(_) => {
                tracing::warn!(op, "RPC timeout");
                Err(BlockchainError::Timeout(self.config.rpc_timeout_secs))
            }
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.call("eth_chainId", self.provider.get_chain_id()).await.map(ChainId)
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        self.call("eth_blockNumber", self.provider.get_block_number()).await
    }

    async fn balance(&self, address: Address) -> BlockchainResult<U256> {
        self.call("eth_getBalance", self.provider.get_balance(address)).await
    }

    async fn code(&self, address: Address) -> BlockchainResult<Bytes> {
        self.call("eth_getCode", self.provider.get_code_at(address)).await
    }

    async fn transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        self.call("eth_getTransactionCount", self.provider.get_transaction_count(address)).await
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        self.call("eth_gasPrice", self.provider.get_gas_price()).await
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash> {
        match timeout(self.timeout_duration, self.provider.send_raw_transaction(&raw)).await {
            Ok(Ok(pending)) => Ok(*pending.tx_hash()),
            Ok(Err(e)) => Err(BlockchainError::Rejected(e.to_string())),
            Err(_) => Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        }
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<TxReceipt>> {
        let receipt = self
            .call("eth_getTransactionReceipt", self.provider.get_transaction_receipt(tx_hash))
            .await?;
        Ok(receipt.as_ref().map(TxReceipt::from))
    }
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("rpc_url", &redact_url(&self.config.rpc_url))
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

/// Strip the path from an RPC URL before logging it.
///
/// Hosted providers embed the API key in the path.
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(url) => match url.host_str() {
            Some(host) => format!("{}://{}/…", url.scheme(), host),
            None => "<invalid url>".to_string(),
        },
        Err(_) => "<invalid url>".to_string(),
    }
}
