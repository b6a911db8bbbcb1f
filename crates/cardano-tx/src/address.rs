//! Shelley address utilities
//!
//! Header byte: high nibble is the address type, low nibble the network id.
//! The payment credential occupies the next 28 bytes.

use bech32::{Bech32, Hrp};
use vault_core::{Address, KeyHash, Network, ScriptHash, TxError};

const CREDENTIAL_LEN: usize = 28;

/// Address type from the header nibble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// Base address: payment + stake credential
    Base { payment_script: bool },
    /// Pointer address: payment credential + stake pointer
    Pointer { payment_script: bool },
    /// Enterprise address: payment credential only
    Enterprise { payment_script: bool },
    /// Reward (stake) address
    Reward,
    /// Byron bootstrap address
    Byron,
}

impl AddressKind {
    fn from_header(header: u8) -> Option<Self> {
        match header >> 4 {
            0b0000 => Some(Self::Base {
                payment_script: false,
            }),
            0b0001 => Some(Self::Base {
                payment_script: true,
            }),
            0b0010 => Some(Self::Base {
                payment_script: false,
            }),
            0b0011 => Some(Self::Base {
                payment_script: true,
            }),
            0b0100 => Some(Self::Pointer {
                payment_script: false,
            }),
            0b0101 => Some(Self::Pointer {
                payment_script: true,
            }),
            0b0110 => Some(Self::Enterprise {
                payment_script: false,
            }),
            0b0111 => Some(Self::Enterprise {
                payment_script: true,
            }),
            0b1000 => Some(Self::Byron),
            0b1110 | 0b1111 => Some(Self::Reward),
            _ => None,
        }
    }

    /// Whether the payment credential is a script hash
    pub fn has_script_payment(&self) -> Option<bool> {
        match self {
            Self::Base { payment_script }
            | Self::Pointer { payment_script }
            | Self::Enterprise { payment_script } => Some(*payment_script),
            Self::Reward | Self::Byron => None,
        }
    }
}

/// Decoded Shelley address bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelleyAddress {
    pub kind: AddressKind,
    pub network_id: u8,
    pub bytes: Vec<u8>,
}

impl ShelleyAddress {
    /// Payment credential bytes (key hash or script hash)
    pub fn payment_credential(&self) -> Option<&[u8]> {
        self.kind.has_script_payment()?;
        self.bytes.get(1..1 + CREDENTIAL_LEN)
    }
}

fn invalid(address: &str, reason: impl Into<String>) -> TxError {
    TxError::InvalidAddress {
        address: address.to_string(),
        reason: reason.into(),
    }
}

/// Decode a bech32 (`addr...`) or raw hex address.
pub fn decode_address(address: &str) -> Result<ShelleyAddress, TxError> {
    let bytes = if address.starts_with("addr") {
        let (hrp, data) =
            bech32::decode(address).map_err(|e| invalid(address, format!("bech32: {}", e)))?;
        let hrp = hrp.as_str().to_string();
        if hrp != "addr" && hrp != "addr_test" {
            return Err(invalid(address, format!("unexpected prefix '{}'", hrp)));
        }
        data
    } else {
        hex::decode(address).map_err(|_| invalid(address, "neither bech32 nor hex"))?
    };

    let header = *bytes.first().ok_or_else(|| invalid(address, "empty"))?;
    let kind = AddressKind::from_header(header)
        .ok_or_else(|| invalid(address, format!("unknown header {:#04x}", header)))?;

    if kind.has_script_payment().is_some() && bytes.len() < 1 + CREDENTIAL_LEN {
        return Err(invalid(address, "payment credential truncated"));
    }

    Ok(ShelleyAddress {
        kind,
        network_id: header & 0x0f,
        bytes,
    })
}

/// Extract the payment key hash from a key-credential address.
pub fn payment_key_hash(address: &Address) -> Result<KeyHash, TxError> {
    let decoded = decode_address(address.as_str())?;
    match decoded.kind.has_script_payment() {
        Some(false) => {}
        Some(true) => return Err(invalid(address.as_str(), "payment part is a script")),
        None => return Err(invalid(address.as_str(), "no payment credential")),
    }
    let credential = decoded
        .payment_credential()
        .ok_or_else(|| invalid(address.as_str(), "payment credential truncated"))?;
    KeyHash::from_bytes(credential).map_err(|e| invalid(address.as_str(), e.to_string()))
}

/// Enterprise address whose payment credential is `script_hash`.
pub fn enterprise_script_address(
    script_hash: &ScriptHash,
    network: Network,
) -> Result<Address, TxError> {
    let mut bytes = Vec::with_capacity(1 + CREDENTIAL_LEN);
    bytes.push(0b0111_0000 | network.network_id());
    bytes.extend_from_slice(&script_hash.to_bytes());
    encode_address(&bytes, network)
}

/// Bech32-encode raw address bytes with the network's prefix.
pub fn encode_address(bytes: &[u8], network: Network) -> Result<Address, TxError> {
    let hrp = Hrp::parse(network.address_hrp())
        .map_err(|e| invalid(network.address_hrp(), e.to_string()))?;
    bech32::encode::<Bech32>(hrp, bytes)
        .map(Address::new)
        .map_err(|e| invalid(&hex::encode(bytes), e.to_string()))
}

/// Check that `address` decodes and belongs to `network`.
pub fn check_network(address: &Address, network: Network) -> Result<(), TxError> {
    let decoded = decode_address(address.as_str())?;
    if decoded.network_id != network.network_id() {
        return Err(invalid(
            address.as_str(),
            format!("address is not on {}", network),
        ));
    }
    Ok(())
}
