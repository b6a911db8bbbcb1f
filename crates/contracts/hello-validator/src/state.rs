//! Hello validator state types

use cardano_tx::Utxo;
use serde::{Deserialize, Serialize};
use vault_core::{DatumHash, KeyHash, Lovelace};

/// A script output locked under an owner's key hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedUtxo {
    pub utxo: Utxo,
    /// Owner key hash carried as the datum
    pub owner: KeyHash,
    /// Hash of the owner datum
    pub datum_hash: DatumHash,
    pub lovelace: Lovelace,
}

impl LockedUtxo {
    pub fn out_ref(&self) -> String {
        self.utxo.out_ref()
    }
}
