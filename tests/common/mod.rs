/*
[INPUT]:  Test configuration requirements
[OUTPUT]: Shared test fixtures and manager builders
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for wallet-session tests

use std::sync::Arc;

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use serde_json::json;
use wallet_session::{
    KeypairWallet, KvStore, MemoryStore, SessionConfig, SessionManager, SessionStore,
};

/// Generate a fresh Ed25519 keypair for testing
pub fn generate_keypair() -> SigningKey {
    SigningKey::generate(&mut OsRng)
}

/// Message template used across scenarios
pub fn test_message() -> serde_json::Value {
    json!({"statement": "Sign in to the test app", "version": 1})
}

/// Build a manager over a keypair wallet and a shared in-memory store
pub fn build_manager(
    key: SigningKey,
    timeout_secs: u64,
) -> (Arc<SessionManager>, Arc<KeypairWallet>, Arc<MemoryStore>) {
    let wallet = Arc::new(KeypairWallet::from_signing_key(key));
    let kv = Arc::new(MemoryStore::new());
    let store = SessionStore::new(kv.clone() as Arc<dyn KvStore>);
    let config = SessionConfig {
        message: test_message(),
        auth_timeout_secs: timeout_secs,
    };
    let manager = Arc::new(SessionManager::new(wallet.clone(), store, config));
    (manager, wallet, kv)
}
