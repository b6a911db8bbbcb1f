//! Hello validator transaction builders
//!
//! Two transaction types:
//! 1. Lock: pay lovelace to the script with the owner key hash as inline datum
//! 2. Unlock: spend the owner's locked output with the fixed message redeemer
//!
//! Input selection, fees, and collateral are left to the wallet.

use cardano_tx::{payment_key_hash, OutputDatum, PlutusScript, TxBuilder, UnsignedTx};
use vault_core::{Address, KeyHash, Lovelace, Network, TxError};

use crate::contract::HelloContract;
use crate::state::LockedUtxo;

pub struct LockRequest {
    pub network: Network,
    /// Validator address
    pub script_address: Address,
    /// Owner's payment key hash, stored as the datum
    pub owner: KeyHash,
    pub lovelace: Lovelace,
    /// Wallet address receiving change
    pub change_address: Option<Address>,
}

/// Build a lock transaction paying `lovelace` to the validator.
pub fn build_lock_tx(req: &LockRequest) -> Result<UnsignedTx, TxError> {
    let datum = OutputDatum::inline(HelloContract::owner_datum(&req.owner));
    let mut builder =
        TxBuilder::new(req.network).send_lovelace(&req.script_address, req.lovelace, Some(datum));
    if let Some(change) = &req.change_address {
        builder = builder.change_address(change);
    }
    builder.build()
}

pub struct UnlockRequest {
    pub network: Network,
    /// Output to spend
    pub locked: LockedUtxo,
    pub script: PlutusScript,
    /// Wallet address receiving the unlocked value; its key hash signs
    pub recipient: Address,
}

/// Build an unlock transaction returning the locked value to `recipient`.
pub fn build_unlock_tx(req: UnlockRequest) -> Result<UnsignedTx, TxError> {
    let signer = payment_key_hash(&req.recipient)?;
    let datum = HelloContract::owner_datum(&req.locked.owner);
    let utxo = req.locked.utxo;

    TxBuilder::new(req.network)
        .redeem_value(utxo.clone(), &req.script, datum, HelloContract::redeemer())
        .send_value(&req.recipient, &utxo)
        .set_required_signers(vec![signer])
        .change_address(&req.recipient)
        .build()
}
