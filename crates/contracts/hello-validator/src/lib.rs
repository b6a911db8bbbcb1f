//! Hello plu-ts validator
//!
//! Locks lovelace at a script address under the owner's payment key hash.
//! The output can be spent by a transaction signed by the owner whose
//! redeemer is the message `"Hello plu-ts"`.

pub mod constants;
pub mod contract;
pub mod fetch;
pub mod state;
pub mod tx_builder;
pub mod validator;

pub use constants::{DEFAULT_LOCK_LOVELACE, REDEEMER_MESSAGE};
pub use contract::{ContractInfo, HelloContract};
pub use fetch::find_locked_utxo;
pub use state::LockedUtxo;
pub use tx_builder::{build_lock_tx, build_unlock_tx, LockRequest, UnlockRequest};
pub use validator::{check_unlock, validate, Rejection, ScriptContext, TxInfo};
