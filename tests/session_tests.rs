/*
[INPUT]:  Keypair wallets and in-memory session stores
[OUTPUT]: Test results for the authentication session lifecycle
[POS]:    Integration tests - session manager scenarios
[UPDATE]: When the authentication flow or validity rule changes
*/

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::{build_manager, generate_keypair, test_message};
use ed25519_dalek::Signer;
use tokio::sync::Semaphore;
use tokio_test::assert_ok;
use wallet_session::{
    AuthSession, AuthState, DEFAULT_STORAGE_KEY, KeypairWallet, KvStore, SessionAuth,
    WalletAdapter, canonicalize, verify_signature,
};

fn encode_pubkey(key: &ed25519_dalek::SigningKey) -> String {
    bs58::encode(key.verifying_key().as_bytes()).into_string()
}

#[tokio::test]
async fn test_scenario_a_disconnected_empty_store() {
    let (manager, wallet, _) = build_manager(generate_keypair(), 600);
    wallet.disconnect();

    assert!(!manager.check_is_authenticated());
    assert!(manager.auth_data().is_none());

    // authenticate without an identity is a safe no-op
    manager.authenticate().await;
    assert!(manager.auth_data().is_none());
    assert_eq!(manager.state(), AuthState::Disconnected);
}

#[tokio::test]
async fn test_scenario_b_authenticate_persists_verifiable_session() {
    let key = generate_keypair();
    let pubkey = encode_pubkey(&key);
    let (manager, _, _) = build_manager(key, 600);

    manager.on_identity_change().await;

    assert_eq!(manager.state(), AuthState::Authenticated);
    assert!(manager.check_is_authenticated());

    let session = manager.auth_data().expect("session persisted");
    assert_eq!(session.pubkey, pubkey);

    let canonical = canonicalize(&test_message(), &pubkey);
    assert!(verify_signature(&session.signature, &pubkey, &canonical));
}

#[tokio::test]
async fn test_authenticate_is_idempotent() {
    let (manager, _, _) = build_manager(generate_keypair(), 600);
    manager.on_identity_change().await;

    let first = manager.auth_data().unwrap();
    manager.authenticate().await;
    let second = manager.auth_data().unwrap();

    // The second call was a no-op: the record is untouched.
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_scenario_c_pubkey_switch_triggers_reauth() {
    let key_p = generate_keypair();
    let (manager, wallet, _) = build_manager(key_p, 600);
    manager.on_identity_change().await;
    assert!(manager.check_is_authenticated());

    // Reconnect with a different keypair: the cached session no longer
    // verifies, but the raw record is still the old identity's.
    let key_q = generate_keypair();
    let pubkey_q = encode_pubkey(&key_q);
    wallet.set_keypair(key_q);

    assert!(!manager.check_is_authenticated());
    assert_ne!(manager.auth_data().unwrap().pubkey, pubkey_q);

    manager.on_identity_change().await;

    assert!(manager.check_is_authenticated());
    assert_eq!(manager.auth_data().unwrap().pubkey, pubkey_q);
}

#[tokio::test]
async fn test_scenario_d_expired_session_is_refreshed() {
    let key = generate_keypair();
    let pubkey = encode_pubkey(&key);
    let timeout = 600;
    let (manager, _, kv) = build_manager(key.clone(), timeout);

    // Plant a properly signed but expired session.
    let canonical = canonicalize(&test_message(), &pubkey);
    let signature = bs58::encode(key.sign(&canonical).to_bytes()).into_string();
    let expired = AuthSession {
        signature,
        pubkey: pubkey.clone(),
        signed_at: chrono::Utc::now().timestamp() - timeout as i64,
    };
    let record = assert_ok!(serde_json::to_string(&expired));
    assert_ok!(kv.set(DEFAULT_STORAGE_KEY, &record));

    assert!(!manager.check_is_authenticated());

    manager.authenticate().await;

    let refreshed = manager.auth_data().unwrap();
    assert!(refreshed.signed_at > expired.signed_at);
    assert!(manager.check_is_authenticated());
}

#[tokio::test]
async fn test_scenario_e_malformed_slot_treated_as_absent() {
    let (manager, _, kv) = build_manager(generate_keypair(), 600);
    assert_ok!(kv.set(DEFAULT_STORAGE_KEY, "{\"signature\": 42, nope"));

    assert!(manager.auth_data().is_none());
    assert!(!manager.check_is_authenticated());
}

#[tokio::test]
async fn test_disconnect_keeps_record_but_invalidates_check() {
    let (manager, wallet, _) = build_manager(generate_keypair(), 600);
    manager.on_identity_change().await;
    assert!(manager.check_is_authenticated());

    wallet.disconnect();
    manager.on_identity_change().await;

    assert_eq!(manager.state(), AuthState::Disconnected);
    assert!(!manager.check_is_authenticated());
    // The cached record outlives the identity.
    assert!(manager.auth_data().is_some());
}

#[tokio::test]
async fn test_session_auth_trait_object() {
    let (manager, _, _) = build_manager(generate_keypair(), 600);
    let auth: Arc<dyn SessionAuth> = manager.clone();

    assert!(!auth.check_is_authenticated());
    auth.authenticate().await;
    assert!(auth.check_is_authenticated());
    assert!(auth.auth_data().is_some());
}

/// Wallet whose signing blocks on a semaphore, to exercise cancellation.
struct GatedWallet {
    inner: KeypairWallet,
    gate: Semaphore,
}

#[async_trait]
impl WalletAdapter for GatedWallet {
    fn connected(&self) -> bool {
        self.inner.connected()
    }

    fn public_key(&self) -> Option<[u8; 32]> {
        self.inner.public_key()
    }

    async fn sign_message(&self, message: &[u8]) -> wallet_session::Result<Vec<u8>> {
        let _permit = self.gate.acquire().await.expect("gate closed");
        self.inner.sign_message(message).await
    }
}

#[tokio::test]
async fn test_identity_change_cancels_inflight_signing() {
    use wallet_session::{MemoryStore, SessionConfig, SessionManager, SessionStore};

    let key_p = generate_keypair();
    let wallet = Arc::new(GatedWallet {
        inner: KeypairWallet::from_signing_key(key_p),
        gate: Semaphore::new(0),
    });
    let kv = Arc::new(MemoryStore::new());
    let store = SessionStore::new(kv.clone() as Arc<dyn KvStore>);
    let config = SessionConfig {
        message: test_message(),
        auth_timeout_secs: 600,
    };
    let manager = Arc::new(SessionManager::new(wallet.clone(), store, config));

    // First authentication parks at the signing gate.
    let stale = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.authenticate().await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert_eq!(manager.state(), AuthState::Authenticating);

    // Identity switches while the request is still in flight.
    let key_q = generate_keypair();
    let pubkey_q = encode_pubkey(&key_q);
    wallet.inner.set_keypair(key_q);
    let fresh = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.on_identity_change().await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    // Release both signing requests; the stale one must not write.
    wallet.gate.add_permits(2);
    assert_ok!(stale.await);
    assert_ok!(fresh.await);

    let session = manager.auth_data().expect("fresh session persisted");
    assert_eq!(session.pubkey, pubkey_q);
    assert!(manager.check_is_authenticated());
}
