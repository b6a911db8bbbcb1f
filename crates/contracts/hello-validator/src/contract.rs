//! Compiled validator handle

use std::path::Path;

use cardano_tx::{PlutusData, PlutusScript, TextEnvelope};
use serde::{Deserialize, Serialize};
use vault_core::{Address, DatumHash, KeyHash, Lovelace, Network, ScriptHash, TxError};

use crate::constants::REDEEMER_MESSAGE;

/// Compiled validator bound to a network
#[derive(Debug, Clone)]
pub struct HelloContract {
    script: PlutusScript,
    network: Network,
    address: Address,
}

impl HelloContract {
    pub fn new(script: PlutusScript, network: Network) -> Result<Self, TxError> {
        let address = script.address(network)?;
        Ok(Self {
            script,
            network,
            address,
        })
    }

    /// Load the text-envelope artifact written by the contract compiler
    pub fn load(path: &Path, network: Network) -> Result<Self, TxError> {
        let script = TextEnvelope::load(path)?.to_script()?;
        let contract = Self::new(script, network)?;
        tracing::info!(
            "Loaded validator {} from {} (address {})",
            contract.script_hash(),
            path.display(),
            contract.address
        );
        Ok(contract)
    }

    pub fn script(&self) -> &PlutusScript {
        &self.script
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn script_hash(&self) -> ScriptHash {
        self.script.hash()
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Datum locking an output to `owner`: the raw key hash bytes
    pub fn owner_datum(owner: &KeyHash) -> PlutusData {
        PlutusData::bytes(owner.to_bytes())
    }

    pub fn owner_datum_hash(owner: &KeyHash) -> DatumHash {
        Self::owner_datum(owner).hash()
    }

    pub fn redeemer() -> PlutusData {
        PlutusData::utf8(REDEEMER_MESSAGE)
    }

    pub fn info(&self, lock_amount: Lovelace) -> ContractInfo {
        ContractInfo {
            network: self.network,
            script_hash: self.script_hash(),
            script_address: self.address.clone(),
            plutus_version: self.script.version.envelope_type().to_string(),
            lock_amount,
            redeemer: REDEEMER_MESSAGE.to_string(),
        }
    }
}

/// Public description of the deployed validator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub network: Network,
    pub script_hash: ScriptHash,
    pub script_address: Address,
    pub plutus_version: String,
    pub lock_amount: Lovelace,
    pub redeemer: String,
}
