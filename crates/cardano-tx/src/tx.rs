//! UTxO and transaction intent structures
//!
//! The JSON shape follows what browser wallet SDKs take as input: UTxOs as
//! `{input: {txHash, outputIndex}, output: {address, amount, dataHash,
//! plutusData}}`, assets as `{unit, quantity}`. The wallet side balances the
//! intent, adds fees and collateral, and serializes the final body.

use serde::{Deserialize, Serialize};
use vault_core::constants::{LOVELACE_UNIT, MIN_OUTPUT_LOVELACE};
use vault_core::{Address, DatumHash, KeyHash, Lovelace, Network, TxError, TxHash};

use crate::address::check_network;
use crate::plutus_data::PlutusData;
use crate::script::PlutusScript;

/// Asset quantity in an output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// `lovelace` or policy id + hex asset name
    pub unit: String,
    pub quantity: String,
}

impl Asset {
    pub fn new(unit: impl Into<String>, quantity: u64) -> Self {
        Self {
            unit: unit.into(),
            quantity: quantity.to_string(),
        }
    }

    pub fn lovelace(amount: Lovelace) -> Self {
        Self::new(LOVELACE_UNIT, amount)
    }

    pub fn quantity_u64(&self) -> Option<u64> {
        self.quantity.parse().ok()
    }
}

/// Sum of the lovelace entries in `amount`
pub fn lovelace_of(amount: &[Asset]) -> Lovelace {
    amount
        .iter()
        .filter(|a| a.unit == LOVELACE_UNIT)
        .filter_map(Asset::quantity_u64)
        .sum()
}

/// Output reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxIn {
    pub tx_hash: TxHash,
    pub output_index: u32,
}

/// Unspent output as reported by the chain provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOut {
    pub address: Address,
    pub amount: Vec<Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_hash: Option<DatumHash>,
    /// Inline datum, hex CBOR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plutus_data: Option<String>,
    /// Reference script, hex CBOR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub input: TxIn,
    pub output: TxOut,
}

impl Utxo {
    /// `txHash#index`
    pub fn out_ref(&self) -> String {
        format!("{}#{}", self.input.tx_hash, self.input.output_index)
    }

    pub fn lovelace(&self) -> Lovelace {
        lovelace_of(&self.output.amount)
    }

    pub fn inline_datum(&self) -> Result<Option<PlutusData>, TxError> {
        self.output
            .plutus_data
            .as_deref()
            .map(PlutusData::from_cbor_hex)
            .transpose()
    }

    /// Datum hash as reported, or computed from the inline datum
    pub fn datum_hash(&self) -> Option<DatumHash> {
        if let Some(hash) = &self.output.data_hash {
            return Some(hash.clone());
        }
        self.inline_datum().ok().flatten().map(|d| d.hash())
    }
}

/// Datum attached to a new output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDatum {
    pub value: PlutusData,
    /// Inline datum when true, datum hash only otherwise
    pub inline: bool,
}

impl OutputDatum {
    pub fn inline(value: PlutusData) -> Self {
        Self {
            value,
            inline: true,
        }
    }
}

/// Output candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOutput {
    pub address: Address,
    pub amount: Vec<Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum: Option<OutputDatum>,
}

impl TxOutput {
    pub fn lovelace(&self) -> Lovelace {
        lovelace_of(&self.amount)
    }
}

/// Script-locked UTxO to spend, with its witness data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptInput {
    pub utxo: Utxo,
    pub script: PlutusScript,
    pub datum: PlutusData,
    pub redeemer: PlutusData,
}

/// Complete unsigned transaction intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTx {
    pub network: Network,
    #[serde(default)]
    pub script_inputs: Vec<ScriptInput>,
    pub outputs: Vec<TxOutput>,
    #[serde(default)]
    pub required_signers: Vec<KeyHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_address: Option<Address>,
}

impl UnsignedTx {
    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty JSON string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn total_output_lovelace(&self) -> Lovelace {
        self.outputs.iter().map(TxOutput::lovelace).sum()
    }
}

/// Witnessed transaction as returned by the wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    /// Hex CBOR
    pub cbor: String,
}

/// Chained builder for [`UnsignedTx`]
#[derive(Debug, Clone)]
pub struct TxBuilder {
    network: Network,
    script_inputs: Vec<ScriptInput>,
    outputs: Vec<TxOutput>,
    required_signers: Vec<KeyHash>,
    change_address: Option<Address>,
}

impl TxBuilder {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            script_inputs: vec![],
            outputs: vec![],
            required_signers: vec![],
            change_address: None,
        }
    }

    /// Pay `lovelace` to `address`, optionally with a datum
    pub fn send_lovelace(
        mut self,
        address: &Address,
        lovelace: Lovelace,
        datum: Option<OutputDatum>,
    ) -> Self {
        self.outputs.push(TxOutput {
            address: address.clone(),
            amount: vec![Asset::lovelace(lovelace)],
            datum,
        });
        self
    }

    /// Pay the full value held by `utxo` to `address`
    pub fn send_value(mut self, address: &Address, utxo: &Utxo) -> Self {
        self.outputs.push(TxOutput {
            address: address.clone(),
            amount: utxo.output.amount.clone(),
            datum: None,
        });
        self
    }

    /// Spend a script-locked UTxO with the given script, datum and redeemer
    pub fn redeem_value(
        mut self,
        utxo: Utxo,
        script: &PlutusScript,
        datum: PlutusData,
        redeemer: PlutusData,
    ) -> Self {
        self.script_inputs.push(ScriptInput {
            utxo,
            script: script.clone(),
            datum,
            redeemer,
        });
        self
    }

    pub fn set_required_signers(mut self, signers: Vec<KeyHash>) -> Self {
        self.required_signers = signers;
        self
    }

    pub fn change_address(mut self, address: &Address) -> Self {
        self.change_address = Some(address.clone());
        self
    }

    /// Validate and produce the unsigned transaction
    pub fn build(self) -> Result<UnsignedTx, TxError> {
        if self.outputs.is_empty() {
            return Err(TxError::EmptyTx);
        }

        for output in &self.outputs {
            check_network(&output.address, self.network)?;
            let value = output.lovelace();
            if value < MIN_OUTPUT_LOVELACE {
                return Err(TxError::OutputTooSmall {
                    address: output.address.to_string(),
                    value,
                    min: MIN_OUTPUT_LOVELACE,
                });
            }
        }

        for input in &self.script_inputs {
            let script_address = input.script.address(self.network)?;
            if input.utxo.output.address != script_address {
                return Err(TxError::InvalidScript {
                    message: format!(
                        "{} is not locked by script {}",
                        input.utxo.out_ref(),
                        input.script.hash()
                    ),
                });
            }
            match input.utxo.datum_hash() {
                Some(hash) if hash == input.datum.hash() => {}
                Some(hash) => {
                    return Err(TxError::InvalidDatum {
                        message: format!(
                            "datum for {} hashes to {}, output carries {}",
                            input.utxo.out_ref(),
                            input.datum.hash(),
                            hash
                        ),
                    })
                }
                None => {
                    return Err(TxError::MissingDatum {
                        utxo: input.utxo.out_ref(),
                    })
                }
            }
        }

        if let Some(change) = &self.change_address {
            check_network(change, self.network)?;
        }

        let mut required_signers: Vec<KeyHash> = Vec::with_capacity(self.required_signers.len());
        for signer in self.required_signers {
            if !required_signers.contains(&signer) {
                required_signers.push(signer);
            }
        }

        tracing::debug!(
            outputs = self.outputs.len(),
            script_inputs = self.script_inputs.len(),
            signers = required_signers.len(),
            "Built unsigned transaction"
        );

        Ok(UnsignedTx {
            network: self.network,
            script_inputs: self.script_inputs,
            outputs: self.outputs,
            required_signers,
            change_address: self.change_address,
        })
    }
}
