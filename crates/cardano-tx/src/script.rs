//! Plutus script artifacts and script hashing

use std::path::Path;

use serde::{Deserialize, Serialize};
use vault_core::{Address, Network, ScriptHash, TxError};

use crate::address::enterprise_script_address;
use crate::plutus_data::{blake2b_224, unwrap_cbor_bytes, wrap_cbor_bytes};

/// Plutus language version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlutusVersion {
    V1,
    V2,
    V3,
}

impl PlutusVersion {
    /// Language tag prefixed to the script bytes when hashing
    pub fn hash_tag(&self) -> u8 {
        match self {
            Self::V1 => 0x01,
            Self::V2 => 0x02,
            Self::V3 => 0x03,
        }
    }

    /// Text-envelope `type` field
    pub fn envelope_type(&self) -> &'static str {
        match self {
            Self::V1 => "PlutusScriptV1",
            Self::V2 => "PlutusScriptV2",
            Self::V3 => "PlutusScriptV3",
        }
    }

    fn from_envelope_type(kind: &str) -> Option<Self> {
        match kind {
            "PlutusScriptV1" => Some(Self::V1),
            "PlutusScriptV2" => Some(Self::V2),
            "PlutusScriptV3" => Some(Self::V3),
            _ => None,
        }
    }
}

/// Compiled Plutus script: hex CBOR plus language version
///
/// `code` holds the ledger's serialized script (one CBOR layer). The JSON form
/// carries the double-wrapped `cborHex` that browser SDKs expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ScriptJson", try_from = "ScriptJson")]
pub struct PlutusScript {
    pub code: String,
    pub version: PlutusVersion,
}

#[derive(Serialize, Deserialize)]
struct ScriptJson {
    code: String,
    version: PlutusVersion,
}

impl From<PlutusScript> for ScriptJson {
    fn from(script: PlutusScript) -> Self {
        Self {
            code: script.wrapped_code(),
            version: script.version,
        }
    }
}

impl TryFrom<ScriptJson> for PlutusScript {
    type Error = TxError;

    fn try_from(json: ScriptJson) -> Result<Self, Self::Error> {
        PlutusScript::new(&json.code, json.version)
    }
}

impl PlutusScript {
    /// Validate and normalize `code` to a single CBOR byte-string layer.
    ///
    /// Compilers emit either the flat program wrapped once (the ledger's
    /// serialized script) or wrapped twice (text envelopes). Both hash the same.
    pub fn new(code: &str, version: PlutusVersion) -> Result<Self, TxError> {
        let raw = hex::decode(code.trim()).map_err(|e| TxError::InvalidScript {
            message: format!("script code is not hex: {}", e),
        })?;
        let inner = unwrap_cbor_bytes(&raw).ok_or_else(|| TxError::InvalidScript {
            message: "script code is not a CBOR byte string".to_string(),
        })?;
        let normalized = if unwrap_cbor_bytes(&inner).is_some() {
            inner
        } else {
            raw
        };
        if unwrap_cbor_bytes(&normalized).map_or(true, |flat| flat.is_empty()) {
            return Err(TxError::InvalidScript {
                message: "script program is empty".to_string(),
            });
        }
        Ok(Self {
            code: hex::encode(normalized),
            version,
        })
    }

    /// Serialized script bytes (single CBOR layer around the flat program)
    pub fn bytes(&self) -> Vec<u8> {
        hex::decode(&self.code).unwrap_or_default()
    }

    /// Double-wrapped hex, as found in text envelopes
    pub fn wrapped_code(&self) -> String {
        hex::encode(wrap_cbor_bytes(&self.bytes()))
    }

    /// blake2b-224 of language tag followed by the serialized script
    pub fn hash(&self) -> ScriptHash {
        let mut preimage = Vec::with_capacity(self.code.len() / 2 + 1);
        preimage.push(self.version.hash_tag());
        preimage.extend_from_slice(&self.bytes());
        ScriptHash::from_array(blake2b_224(&preimage))
    }

    /// Enterprise script address on `network`
    pub fn address(&self, network: Network) -> Result<Address, TxError> {
        enterprise_script_address(&self.hash(), network)
    }

    /// Text envelope for this script (double-wrapped `cborHex`)
    pub fn to_envelope(&self, description: &str) -> TextEnvelope {
        TextEnvelope {
            kind: self.version.envelope_type().to_string(),
            description: description.to_string(),
            cbor_hex: self.wrapped_code(),
        }
    }
}

/// Compiler output file: `{"type", "description", "cborHex"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "cborHex")]
    pub cbor_hex: String,
}

impl TextEnvelope {
    pub fn from_json(raw: &str) -> Result<Self, TxError> {
        serde_json::from_str(raw).map_err(|e| TxError::InvalidScript {
            message: format!("invalid text envelope: {}", e),
        })
    }

    pub fn load(path: &Path) -> Result<Self, TxError> {
        let raw = std::fs::read_to_string(path).map_err(|e| TxError::InvalidScript {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_json(&raw)
    }

    pub fn to_script(&self) -> Result<PlutusScript, TxError> {
        let version =
            PlutusVersion::from_envelope_type(&self.kind).ok_or_else(|| TxError::InvalidScript {
                message: format!("unsupported script type '{}'", self.kind),
            })?;
        PlutusScript::new(&self.cbor_hex, version)
    }
}
