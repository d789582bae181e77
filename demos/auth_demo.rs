/*
[INPUT]:  A generated keypair wallet and a file-backed store
[OUTPUT]: Console walkthrough of the authentication session lifecycle
[POS]:    Examples - session flow demonstration
[UPDATE]: When the session flow changes
*/

use std::sync::Arc;

use serde_json::json;
use wallet_session::{
    AuthState, FileStore, KeypairWallet, KvStore, SessionConfig, SessionManager, SessionStore,
};

/// Example: wallet authentication session
///
/// 1. Connect a wallet (here: an in-process keypair)
/// 2. React to the identity change: sign the canonical message and cache it
/// 3. Re-check: the cached session is reused, no second signature
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    println!("=== Wallet Session Example ===\n");

    let wallet = Arc::new(KeypairWallet::generate());
    println!("✓ Wallet connected");

    let dir = std::env::temp_dir().join("wallet-session-demo");
    let store = SessionStore::new(Arc::new(FileStore::new(&dir)) as Arc<dyn KvStore>);
    let config = SessionConfig {
        message: json!({"statement": "Sign in to the demo app"}),
        auth_timeout_secs: 15 * 60,
    };
    let manager = SessionManager::new(wallet.clone(), store, config);

    println!("  authenticated before signin: {}", manager.check_is_authenticated());

    // The host calls this after every wallet connect/disconnect/switch.
    manager.on_identity_change().await;
    assert_eq!(manager.state(), AuthState::Authenticated);
    println!("✓ Challenge signed and session cached");

    if let Some(session) = manager.auth_data() {
        println!("  pubkey:   {}", session.pubkey);
        println!("  signedAt: {}", session.signed_at);
    }

    // A second authenticate is a no-op while the session is valid.
    manager.authenticate().await;
    println!("  authenticated after signin:  {}", manager.check_is_authenticated());

    println!("\n✓ Session example complete (store: {})", dir.display());
}
