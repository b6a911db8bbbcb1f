//! Koios response shapes and their conversion into the shared UTxO model

use cardano_tx::{Asset, TxIn, TxOut, Utxo};
use serde::{Deserialize, Deserializer, Serialize};
use vault_core::{Address, DatumHash, ProviderError, TxHash};

/// Koios returns quantities as strings, some deployments as numbers
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected quantity, got {}",
            other
        ))),
    }
}

/// Entry of `POST /address_utxos` with `_extended: true`
#[derive(Debug, Clone, Deserialize)]
pub struct KoiosUtxo {
    pub tx_hash: String,
    pub tx_index: u32,
    pub address: String,
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
    #[serde(default)]
    pub datum_hash: Option<String>,
    #[serde(default)]
    pub inline_datum: Option<KoiosInlineDatum>,
    #[serde(default)]
    pub reference_script: Option<KoiosReferenceScript>,
    #[serde(default)]
    pub asset_list: Option<Vec<KoiosAsset>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KoiosInlineDatum {
    pub bytes: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KoiosReferenceScript {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub bytes: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KoiosAsset {
    pub policy_id: String,
    #[serde(default)]
    pub asset_name: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub quantity: String,
}

impl KoiosAsset {
    /// Policy id followed by the hex asset name
    pub fn unit(&self) -> String {
        format!(
            "{}{}",
            self.policy_id,
            self.asset_name.as_deref().unwrap_or_default()
        )
    }
}

impl KoiosUtxo {
    /// Every output holds lovelace; other units are looked up in `asset_list`
    pub fn holds_asset(&self, unit: &str) -> bool {
        if unit == vault_core::constants::LOVELACE_UNIT {
            return true;
        }
        self.asset_list
            .as_ref()
            .is_some_and(|assets| assets.iter().any(|a| a.unit() == unit))
    }

    pub fn into_utxo(self) -> Result<Utxo, ProviderError> {
        let tx_hash = TxHash::parse(&self.tx_hash)
            .map_err(|e| ProviderError::ParseError(format!("tx_hash {}: {}", self.tx_hash, e)))?;

        let data_hash = self
            .datum_hash
            .as_deref()
            .map(DatumHash::parse)
            .transpose()
            .map_err(|e| ProviderError::ParseError(format!("datum_hash: {}", e)))?;

        let mut amount = vec![Asset {
            unit: vault_core::constants::LOVELACE_UNIT.to_string(),
            quantity: self.value,
        }];
        for asset in self.asset_list.unwrap_or_default() {
            amount.push(Asset {
                unit: asset.unit(),
                quantity: asset.quantity,
            });
        }

        Ok(Utxo {
            input: TxIn {
                tx_hash,
                output_index: self.tx_index,
            },
            output: TxOut {
                address: Address::new(self.address),
                amount,
                data_hash,
                plutus_data: self.inline_datum.map(|d| d.bytes),
                script_ref: self.reference_script.and_then(|s| s.bytes),
            },
        })
    }
}

/// Entry of `POST /tx_status`
#[derive(Debug, Clone, Deserialize)]
pub struct KoiosTxStatus {
    pub tx_hash: String,
    #[serde(default)]
    pub num_confirmations: Option<u64>,
}

/// Entry of `GET /tip`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainTip {
    pub hash: String,
    pub epoch_no: u64,
    pub abs_slot: u64,
    pub epoch_slot: u64,
    #[serde(alias = "block_no")]
    pub block_height: u64,
    /// Unix seconds
    pub block_time: u64,
}
