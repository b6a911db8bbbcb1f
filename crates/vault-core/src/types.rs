//! Core type definitions for hello-vault

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::HashParseError;

/// Declares a fixed-length, lowercase-hex hash newtype.
macro_rules! hex_hash {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Length of the hash in bytes
            pub const LEN: usize = $len;

            /// Parse from a hex string, validating length and characters.
            pub fn parse(hex_str: &str) -> Result<Self, HashParseError> {
                let trimmed = hex_str.trim();
                if trimmed.is_empty() {
                    return Err(HashParseError::Empty);
                }
                let bytes = hex::decode(trimmed)
                    .map_err(|e| HashParseError::InvalidHex(e.to_string()))?;
                Self::from_bytes(&bytes)
            }

            pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashParseError> {
                if bytes.len() != $len {
                    return Err(HashParseError::Length {
                        expected: $len,
                        actual: bytes.len(),
                    });
                }
                Ok(Self(hex::encode(bytes)))
            }

            pub fn from_array(bytes: [u8; $len]) -> Self {
                Self(hex::encode(bytes))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn to_bytes(&self) -> Vec<u8> {
                // Validated on construction
                hex::decode(&self.0).unwrap_or_default()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = HashParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = HashParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

hex_hash!(
    /// Payment key hash (blake2b-224 of a verification key)
    KeyHash,
    28
);

hex_hash!(
    /// Script hash (blake2b-224 of language tag + script bytes)
    ScriptHash,
    28
);

hex_hash!(
    /// Datum hash (blake2b-256 of the CBOR-encoded datum)
    DatumHash,
    32
);

hex_hash!(
    /// Transaction hash (blake2b-256 of the transaction body)
    TxHash,
    32
);

/// Shelley address in bech32 form (e.g. `addr_test1...`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is a mainnet address
    pub fn is_mainnet(&self) -> bool {
        self.0.starts_with("addr1")
    }

    /// Check if this is a testnet (preprod/preview) address
    pub fn is_testnet(&self) -> bool {
        self.0.starts_with("addr_test1")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Preprod,
    Preview,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Preprod => "preprod",
            Self::Preview => "preview",
        }
    }

    /// Network id carried in the address header nibble
    pub fn network_id(&self) -> u8 {
        match self {
            Self::Mainnet => 1,
            Self::Preprod | Self::Preview => 0,
        }
    }

    /// Bech32 human-readable prefix for payment addresses
    pub fn address_hrp(&self) -> &'static str {
        match self {
            Self::Mainnet => "addr",
            Self::Preprod | Self::Preview => "addr_test",
        }
    }

    /// Public Koios endpoint for this network
    pub fn default_koios_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://api.koios.rest/api/v1",
            Self::Preprod => "https://preprod.koios.rest/api/v1",
            Self::Preview => "https://preview.koios.rest/api/v1",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "preprod" => Ok(Self::Preprod),
            "preview" => Ok(Self::Preview),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}

/// Lovelace amount (1 ADA = 1_000_000 lovelace)
pub type Lovelace = u64;

/// Constants
pub mod constants {
    use super::Lovelace;

    /// 1 ADA in lovelace
    pub const LOVELACE_PER_ADA: Lovelace = 1_000_000;

    /// Smallest output value accepted by the builder. The ledger minimum
    /// depends on output size; outputs below this are always rejected.
    pub const MIN_OUTPUT_LOVELACE: Lovelace = 1_000_000;

    /// Asset unit for the native currency
    pub const LOVELACE_UNIT: &str = "lovelace";
}
