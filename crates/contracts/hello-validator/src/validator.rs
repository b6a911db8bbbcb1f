//! Off-chain mirror of the on-chain predicate
//!
//! The validator receives the owner key hash (the datum), the message (the
//! redeemer) and the script context. It succeeds iff the message equals
//! [`REDEEMER_MESSAGE`] and the owner is among the transaction signatories.

use cardano_tx::{PlutusData, UnsignedTx};
use thiserror::Error;
use vault_core::KeyHash;

use crate::constants::REDEEMER_MESSAGE;

/// Subset of the transaction info the predicate reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxInfo {
    pub signatories: Vec<KeyHash>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptContext {
    pub tx: TxInfo,
}

impl ScriptContext {
    pub fn with_signatories(signatories: Vec<KeyHash>) -> Self {
        Self {
            tx: TxInfo { signatories },
        }
    }

    /// Context as the ledger would build it: signatories are the required signers
    pub fn from_unsigned(tx: &UnsignedTx) -> Self {
        Self::with_signatories(tx.required_signers.clone())
    }
}

/// The validator predicate
pub fn validate(owner: &KeyHash, message: &[u8], ctx: &ScriptContext) -> bool {
    let polite = message == REDEEMER_MESSAGE.as_bytes();
    let signed_by_owner = ctx.tx.signatories.iter().any(|s| s == owner);
    polite && signed_by_owner
}

/// Reason an unlock transaction would fail validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("transaction spends no script input")]
    NoScriptInput,

    #[error("datum of {utxo} is not a 28-byte key hash")]
    DatumNotKeyHash { utxo: String },

    #[error("datum owner {actual} does not match wallet key hash {expected}")]
    WrongOwner { expected: String, actual: String },

    #[error("redeemer of {utxo} is not the expected message")]
    WrongMessage { utxo: String },

    #[error("owner {owner} is not among the required signers")]
    MissingSignature { owner: String },
}

fn datum_owner(datum: &PlutusData) -> Option<KeyHash> {
    datum.as_bytes().and_then(|b| KeyHash::from_bytes(b).ok())
}

/// Evaluate the predicate for every script input of `tx` before signing.
pub fn check_unlock(tx: &UnsignedTx, owner: &KeyHash) -> Result<(), Rejection> {
    if tx.script_inputs.is_empty() {
        return Err(Rejection::NoScriptInput);
    }

    let ctx = ScriptContext::from_unsigned(tx);
    for input in &tx.script_inputs {
        let utxo = input.utxo.out_ref();
        let datum_owner =
            datum_owner(&input.datum).ok_or_else(|| Rejection::DatumNotKeyHash { utxo: utxo.clone() })?;
        if &datum_owner != owner {
            return Err(Rejection::WrongOwner {
                expected: owner.to_string(),
                actual: datum_owner.to_string(),
            });
        }

        let message = input.redeemer.as_bytes().unwrap_or_default();
        if validate(&datum_owner, message, &ctx) {
            continue;
        }
        if message != REDEEMER_MESSAGE.as_bytes() {
            return Err(Rejection::WrongMessage { utxo });
        }
        return Err(Rejection::MissingSignature {
            owner: datum_owner.to_string(),
        });
    }
    Ok(())
}
