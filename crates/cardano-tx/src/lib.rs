//! cardano-tx: Transaction building utilities for Cardano
//!
//! Provides Plutus data encoding, address and script hashing, the UTxO and
//! unsigned transaction model handed to wallets, and the provider capability
//! traits the lock/unlock flows are written against.

pub mod address;
pub mod plutus_data;
pub mod provider;
pub mod script;
pub mod tx;

pub use address::{
    decode_address, enterprise_script_address, payment_key_hash, AddressKind, ShelleyAddress,
};
pub use plutus_data::{blake2b_224, blake2b_256, PlutusData};
pub use provider::{ChainProvider, WalletProvider};
pub use script::{PlutusScript, PlutusVersion, TextEnvelope};
pub use tx::*;
