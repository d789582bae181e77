/*
[INPUT]:  Error sources (decoding, wallet capability, storage, serialization)
[OUTPUT]: Structured error types with context
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use thiserror::Error;

/// Main error type for wallet session operations
#[derive(Error, Debug)]
pub enum SessionError {
    /// Signature or public key text is not valid base58
    #[error("base58 decode failed: {0}")]
    Decode(#[from] bs58::decode::Error),

    /// Wallet has no public key or no signing support
    #[error("wallet unavailable: {0}")]
    WalletUnavailable(String),

    /// The user rejected the signing request
    #[error("signing rejected: {0}")]
    SigningRejected(String),

    /// The wallet failed to produce a signature
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Storage backend read/write failed
    #[error("storage error: {0}")]
    Storage(String),

    /// Persisted session record is unparseable
    #[error("corrupt session record: {0}")]
    StorageCorrupt(String),

    /// Serialization/deserialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error from a file-backed store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Check if the error originates in the external wallet capability
    pub fn is_wallet_error(&self) -> bool {
        matches!(
            self,
            SessionError::WalletUnavailable(_)
                | SessionError::SigningRejected(_)
                | SessionError::SigningFailed(_)
        )
    }
}

/// Result type alias for wallet session operations
pub type Result<T> = std::result::Result<T, SessionError>;
