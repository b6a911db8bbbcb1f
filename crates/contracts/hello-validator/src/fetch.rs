//! Locked UTxO discovery via the chain provider

use cardano_tx::ChainProvider;
use vault_core::{Address, KeyHash, ProviderError};

use crate::constants::LOCKED_ASSET;
use crate::contract::HelloContract;
use crate::state::LockedUtxo;

/// Find the first output at `script_address` whose datum hash equals the hash
/// of `owner`'s key-hash datum.
pub async fn find_locked_utxo(
    chain: &dyn ChainProvider,
    script_address: &Address,
    owner: &KeyHash,
) -> Result<Option<LockedUtxo>, ProviderError> {
    let datum_hash = HelloContract::owner_datum_hash(owner);
    let utxos = chain
        .fetch_address_utxos(script_address, Some(LOCKED_ASSET))
        .await?;
    let scanned = utxos.len();

    for utxo in utxos {
        match utxo.datum_hash() {
            Some(hash) if hash == datum_hash => {
                tracing::debug!(
                    utxo = %utxo.out_ref(),
                    "Found locked UTxO for {}",
                    owner
                );
                return Ok(Some(LockedUtxo {
                    lovelace: utxo.lovelace(),
                    utxo,
                    owner: owner.clone(),
                    datum_hash,
                }));
            }
            Some(hash) => {
                tracing::debug!(utxo = %utxo.out_ref(), datum_hash = %hash, "Skipping UTxO of another owner");
            }
            None => {
                tracing::debug!(utxo = %utxo.out_ref(), "Skipping UTxO without datum");
            }
        }
    }

    tracing::debug!(
        "No locked UTxO with datum hash {} among {} at {}",
        datum_hash,
        scanned,
        script_address
    );
    Ok(None)
}
