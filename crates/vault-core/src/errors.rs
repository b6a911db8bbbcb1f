//! Error types for hello-vault

use thiserror::Error;

/// Core errors that can occur in hello-vault
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TxError),

    #[error("{0}")]
    Flow(#[from] FlowError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Hex hash parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashParseError {
    #[error("empty hash")]
    Empty,

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
}

/// Chain query provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider unreachable at {url}")]
    Unreachable { url: String },

    #[error("Provider returned error: {message}")]
    ApiError { message: String },

    #[error("Provider rate limit exceeded")]
    RateLimited,

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Wallet provider errors
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("No wallet connected")]
    NotConnected,

    #[error("Wallet rejected the request: {reason}")]
    Rejected { reason: String },

    #[error("Wallet did not answer within {secs}s")]
    Timeout { secs: u64 },

    #[error("Wallet bridge failure: {message}")]
    Bridge { message: String },

    #[error("Wallet has no used addresses")]
    NoUsedAddress,
}

/// Transaction building errors
#[derive(Debug, Error)]
pub enum TxError {
    #[error("Invalid address: {address} ({reason})")]
    InvalidAddress { address: String, reason: String },

    #[error("Invalid datum: {message}")]
    InvalidDatum { message: String },

    #[error("Invalid script: {message}")]
    InvalidScript { message: String },

    #[error("Transaction has no outputs or inputs")]
    EmptyTx,

    #[error("Output to {address} carries {value} lovelace, minimum is {min}")]
    OutputTooSmall {
        address: String,
        value: u64,
        min: u64,
    },

    #[error("Script input {utxo} has no datum")]
    MissingDatum { utxo: String },

    #[error("Wallet returned no transaction hash")]
    MissingTxHash,
}

/// Lock/unlock flow errors
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Action '{action}' not allowed while session is {state}")]
    Busy { action: String, state: String },

    #[error("Wallet is not connected")]
    WalletNotConnected,

    #[error("No locked UTxO with datum hash {datum_hash} at the script address")]
    NoLockedUtxo { datum_hash: String },

    #[error("Unlock transaction rejected by pre-flight check: {reason}")]
    PreflightRejected { reason: String },

    #[error("Transaction {tx_hash} not confirmed within {secs}s")]
    ConfirmationTimedOut { tx_hash: String, secs: u64 },

    #[error("Confirmation watch for {tx_hash} cancelled")]
    ConfirmationCancelled { tx_hash: String },

    /// The session was reset after the flow started; the transaction may
    /// still land on chain.
    #[error("Session reset; transaction {tx_hash} was submitted but is no longer tracked")]
    Detached { tx_hash: String },
}

/// Result type alias for hello-vault operations
pub type Result<T> = std::result::Result<T, Error>;

impl FlowError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Busy { .. } => "busy",
            Self::WalletNotConnected => "wallet_not_connected",
            Self::NoLockedUtxo { .. } => "no_locked_utxo",
            Self::PreflightRejected { .. } => "preflight_rejected",
            Self::ConfirmationTimedOut { .. } => "confirmation_timed_out",
            Self::ConfirmationCancelled { .. } => "confirmation_cancelled",
            Self::Detached { .. } => "detached",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Busy { .. } => 409,
            Self::WalletNotConnected => 412,
            Self::NoLockedUtxo { .. } => 404,
            Self::PreflightRejected { .. } => 422,
            Self::ConfirmationTimedOut { .. } => 504,
            Self::ConfirmationCancelled { .. } => 409,
            Self::Detached { .. } => 409,
        }
    }
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Provider(_) => "provider_error",
            Self::Wallet(WalletError::NotConnected) => "wallet_not_connected",
            Self::Wallet(WalletError::Rejected { .. }) => "wallet_rejected",
            Self::Wallet(WalletError::Timeout { .. }) => "wallet_timeout",
            Self::Wallet(_) => "wallet_error",
            Self::Transaction(_) => "transaction_error",
            Self::Flow(e) => e.error_code(),
            Self::Config(_) => "config_error",
            Self::Serialization(_) => "serialization_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Provider(_) => 502,
            Self::Wallet(WalletError::NotConnected) => 412,
            Self::Wallet(WalletError::Timeout { .. }) => 504,
            Self::Wallet(_) => 502,
            Self::Transaction(_) => 422,
            Self::Flow(e) => e.status_code(),
            Self::Config(_) | Self::Serialization(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_error_codes() {
        let err = FlowError::NoLockedUtxo {
            datum_hash: "ab".into(),
        };
        assert_eq!(err.error_code(), "no_locked_utxo");
        assert_eq!(err.status_code(), 404);

        let err = FlowError::Busy {
            action: "lock".into(),
            state: "locking".into(),
        };
        assert_eq!(err.error_code(), "busy");
        assert_eq!(err.status_code(), 409);

        let err = FlowError::Detached {
            tx_hash: "cd".into(),
        };
        assert_eq!(err.error_code(), "detached");
        assert!(err.to_string().contains("cd"));
    }

    #[test]
    fn test_error_delegates_to_flow() {
        let err: Error = FlowError::WalletNotConnected.into();
        assert_eq!(err.error_code(), "wallet_not_connected");
        assert_eq!(err.status_code(), 412);

        let err: Error = WalletError::Timeout { secs: 300 }.into();
        assert_eq!(err.error_code(), "wallet_timeout");
        assert_eq!(err.status_code(), 504);
    }
}
