//! Hello validator constants

use vault_core::Lovelace;

/// Redeemer message the validator accepts
pub const REDEEMER_MESSAGE: &str = "Hello plu-ts";

/// Amount sent to the script by a lock, unless configured otherwise
pub const DEFAULT_LOCK_LOVELACE: Lovelace = 2_000_000;

/// Asset filter passed with the script address query. Every output holds
/// lovelace, so this selects all of them; the owner match on the datum hash
/// is what picks the locked output.
pub const LOCKED_ASSET: &str = vault_core::constants::LOVELACE_UNIT;

/// Text-envelope description for the compiled validator
pub const SCRIPT_DESCRIPTION: &str = "hello plu-ts validator";
