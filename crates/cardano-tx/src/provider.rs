//! Capability traits for the wallet and the chain query service
//!
//! Flows hold these as `Arc<dyn ...>` so the browser bridge, the Koios
//! client, and test doubles are interchangeable.

use async_trait::async_trait;
use vault_core::{Address, ProviderError, TxHash, WalletError};

use crate::tx::{SignedTx, UnsignedTx, Utxo};

/// CIP-30 style wallet
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Enable the wallet. Returns the wallet name.
    async fn connect(&self) -> Result<String, WalletError>;

    async fn is_connected(&self) -> bool;

    async fn used_addresses(&self) -> Result<Vec<Address>, WalletError>;

    async fn first_used_address(&self) -> Result<Address, WalletError> {
        self.used_addresses()
            .await?
            .into_iter()
            .next()
            .ok_or(WalletError::NoUsedAddress)
    }

    /// Complete, balance, and witness `tx`. With `partial_sign` the wallet
    /// adds its witnesses without requiring every signer.
    async fn sign_tx(&self, tx: &UnsignedTx, partial_sign: bool) -> Result<SignedTx, WalletError>;

    /// Submit and return the transaction hash exactly as the wallet reports it
    async fn submit_tx(&self, tx: &SignedTx) -> Result<String, WalletError>;
}

/// Read-only chain queries
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// UTxOs at `address`, optionally only those holding `asset`
    async fn fetch_address_utxos(
        &self,
        address: &Address,
        asset: Option<&str>,
    ) -> Result<Vec<Utxo>, ProviderError>;

    /// Confirmation count, `None` while the transaction is unknown or in mempool
    async fn tx_confirmations(&self, tx_hash: &TxHash) -> Result<Option<u64>, ProviderError>;
}
