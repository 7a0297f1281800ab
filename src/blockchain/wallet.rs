//! Treasury key custody and transaction signing.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "TREASURY_PRIVATE_KEY";

/// Wallet holding the treasury key.
#[derive(Clone)]
pub struct Wallet {
    address: Address,
    /// Signing wallet built from the private key.
    signer: EthereumWallet,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// Accepts exactly 64 hex characters, optionally `0x`-prefixed, with
    /// surrounding whitespace ignored.
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let key_hex = normalize_private_key(private_key_hex)?;

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;
        let address = signer.address();

        tracing::info!(address = %address, "Wallet initialized");

        Ok(Self {
            address,
            signer: EthereumWallet::from(signer),
        })
    }

    /// Load wallet from environment variable.
    ///
    /// Reads `TREASURY_PRIVATE_KEY` from environment.
    pub fn from_env() -> BlockchainResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            BlockchainError::Wallet(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a fully populated transaction request into raw EIP-2718 bytes.
    ///
    /// Fails if a required field (nonce, gas, chain id, recipient) is missing.
    pub async fn sign_transaction(&self, tx: TransactionRequest) -> BlockchainResult<Bytes> {
        let envelope = tx
            .with_from(self.address)
            .build(&self.signer)
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))?;
        Ok(envelope.encoded_2718().into())
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet").field("address", &self.address).finish()
    }
}

/// Validate the shape of a private key and return its bare hex digits.
fn normalize_private_key(raw: &str) -> BlockchainResult<&str> {
    let trimmed = raw.trim();
    let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);

    if key_hex.len() != 64 {
        return Err(BlockchainError::Wallet(format!(
            "Invalid private key length: expected 64 hex characters, got {}",
            key_hex.len()
        )));
    }
    if !key_hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(BlockchainError::Wallet(
            "Invalid private key format: non-hex characters".to_string(),
        ));
    }
    Ok(key_hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::consensus::TxEnvelope;
    use alloy::eips::eip2718::Decodable2718;
    use alloy::primitives::U256;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_wallet_from_private_key() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_wallet_with_0x_prefix_and_whitespace() {
        let wallet = Wallet::from_private_key(&format!("  0x{}\n", TEST_PRIVATE_KEY)).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_invalid_private_key() {
        let err = Wallet::from_private_key("invalid_key").unwrap_err();
        assert!(err.to_string().contains("Invalid private key length"));

        let err = Wallet::from_private_key(&"zz".repeat(32)).unwrap_err();
        assert!(err.to_string().contains("non-hex"));

        assert!(Wallet::from_private_key(&TEST_PRIVATE_KEY[..62]).is_err());
    }

    #[test]
    fn test_debug_hides_key() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let rendered = format!("{:?}", wallet);
        assert!(!rendered.contains(TEST_PRIVATE_KEY));
    }

    #[tokio::test]
    async fn test_sign_legacy_transfer() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let tx = TransactionRequest::default()
            .with_to(Address::repeat_byte(0x11))
            .with_value(U256::from(1_000u64))
            .with_nonce(7)
            .with_gas_limit(21_000)
            .with_gas_price(1_000_000_000)
            .with_chain_id(31337);

        let raw = wallet.sign_transaction(tx).await.unwrap();
        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap();
        assert!(envelope.is_legacy());
    }

    #[tokio::test]
    async fn test_sign_incomplete_request_fails() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        // No nonce, gas or chain id
        let tx = TransactionRequest::default().with_to(Address::repeat_byte(0x11));
        assert!(wallet.sign_transaction(tx).await.is_err());
    }
}
