/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public wallet-session crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

//! Client-side wallet authentication session cache.
//!
//! A user proves control of a keypair by signing a canonical challenge
//! message; the signature is cached locally and reused as proof of
//! authentication until it expires or the wallet identity changes.

pub mod codec;
pub mod error;
pub mod manager;
pub mod message;
pub mod store;
pub mod verify;
pub mod wallet;

// Re-export commonly used types
pub use error::{Result, SessionError};
pub use manager::{
    AuthState,
    MAX_AUTH_TIMEOUT_SECS,
    NoopSessionAuth,
    SessionAuth,
    SessionConfig,
    SessionManager,
    clamp_auth_timeout,
};
pub use message::{PUBKEY_FIELD, canonicalize};
pub use store::{
    AuthSession,
    DEFAULT_STORAGE_KEY,
    FileStore,
    KvStore,
    MemoryStore,
    SessionStore,
};
pub use verify::verify_signature;
pub use wallet::{KeypairWallet, WalletAdapter};
