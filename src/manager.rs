/*
[INPUT]:  Wallet identity events, message template, session timeout
[OUTPUT]: Cached authentication state and fresh signed sessions
[POS]:    Orchestration layer - drives check/sign/persist on identity change
[UPDATE]: When the authentication state machine or validity rule changes
*/

use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::codec;
use crate::error::Result;
use crate::message;
use crate::store::{AuthSession, SessionStore};
use crate::verify;
use crate::wallet::WalletAdapter;

/// Ceiling for a session lifetime: one day.
pub const MAX_AUTH_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Clamp a configured timeout to [`MAX_AUTH_TIMEOUT_SECS`].
///
/// The ceiling is currently advisory: [`SessionManager::new`] computes it and
/// warns when the configured value exceeds it, but keeps the caller's value
/// active. Callers that want the bound enforced should clamp before
/// constructing the config.
pub fn clamp_auth_timeout(secs: u64) -> u64 {
    secs.min(MAX_AUTH_TIMEOUT_SECS)
}

/// Configuration accepted by the session manager at construction
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Message template signed by the wallet; the signer's public key is
    /// injected under the reserved field unless already present
    pub message: Value,
    /// Maximum session age in seconds (positive; intended ceiling one day)
    pub auth_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            message: json!({"statement": "Sign this message to authenticate."}),
            auth_timeout_secs: 60 * 60,
        }
    }
}

/// Authentication state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No wallet identity present
    Disconnected,
    /// Identity present, session validity unknown or stale
    Unverified,
    /// A signing request is in flight
    Authenticating,
    /// Stored session verified for the current identity within the timeout
    Authenticated,
}

/// Operations the surrounding application sees.
///
/// Object-safe so hosts can hold a `dyn SessionAuth` before a real manager
/// exists; [`NoopSessionAuth`] is the safe pre-initialization default.
#[async_trait]
pub trait SessionAuth: Send + Sync {
    /// Pure read of current validity; never initiates signing.
    fn check_is_authenticated(&self) -> bool;
    /// Idempotent, fire-and-forget re-authentication; errors are logged.
    async fn authenticate(&self);
    /// Raw read-through to the session store, independent of identity.
    fn auth_data(&self) -> Option<AuthSession>;
}

/// No-op implementation: unauthenticated, no-op, absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSessionAuth;

#[async_trait]
impl SessionAuth for NoopSessionAuth {
    fn check_is_authenticated(&self) -> bool {
        false
    }

    async fn authenticate(&self) {}

    fn auth_data(&self) -> Option<AuthSession> {
        None
    }
}

/// Orchestrates the wallet authentication session.
///
/// Owns the decision logic: detects identity changes, decides whether
/// re-authentication is required, drives signing through the wallet
/// capability, and reads/writes the session record. Hosts call
/// [`on_identity_change`](Self::on_identity_change) after every wallet
/// connect, disconnect, or account switch.
pub struct SessionManager {
    wallet: Arc<dyn WalletAdapter>,
    store: SessionStore,
    config: SessionConfig,
    state: RwLock<AuthState>,
    cancel: Mutex<CancellationToken>,
}

impl SessionManager {
    /// Create a manager over a wallet capability and session store.
    pub fn new(wallet: Arc<dyn WalletAdapter>, store: SessionStore, config: SessionConfig) -> Self {
        let clamped = clamp_auth_timeout(config.auth_timeout_secs);
        if clamped != config.auth_timeout_secs {
            warn!(
                configured = config.auth_timeout_secs,
                ceiling = MAX_AUTH_TIMEOUT_SECS,
                "auth timeout exceeds the one-day ceiling; ceiling is advisory and not enforced"
            );
        }
        if config.auth_timeout_secs == 0 {
            warn!("auth timeout of zero means no session is ever valid");
        }

        Self {
            wallet,
            store,
            config,
            state: RwLock::new(AuthState::Disconnected),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Current state machine state
    pub fn state(&self) -> AuthState {
        *self.state.read().unwrap()
    }

    fn set_state(&self, state: AuthState) {
        *self.state.write().unwrap() = state;
    }

    fn current_pubkey(&self) -> Option<String> {
        if !self.wallet.connected() {
            return None;
        }
        self.wallet.public_key().map(|bytes| codec::encode(&bytes))
    }

    /// Validity rule: the stored signature verifies against the *current*
    /// pubkey's canonical message and `now - signed_at < auth_timeout`.
    /// A session signed by a different identity fails verification
    /// naturally; no explicit pubkey comparison is made.
    fn session_valid_at(&self, session: &AuthSession, pubkey: &str, now: i64) -> bool {
        let age = now.saturating_sub(session.signed_at);
        if age >= self.config.auth_timeout_secs as i64 {
            return false;
        }
        let canonical = message::canonicalize(&self.config.message, pubkey);
        verify::verify_signature(&session.signature, pubkey, &canonical)
    }

    /// React to a wallet identity change.
    ///
    /// Cancels any stale in-flight signing first so it cannot persist a
    /// session for the previous identity, then re-runs the validity check
    /// and re-authenticates if needed.
    pub async fn on_identity_change(&self) {
        let stale = {
            let mut guard = self.cancel.lock().unwrap();
            std::mem::replace(&mut *guard, CancellationToken::new())
        };
        stale.cancel();

        if self.current_pubkey().is_none() {
            debug!("wallet disconnected");
            self.set_state(AuthState::Disconnected);
            return;
        }

        self.set_state(AuthState::Unverified);
        self.authenticate().await;
    }

    /// Pure read of current validity per the rule above.
    ///
    /// Returns `false` on any internal failure (no identity, empty or
    /// corrupt store, decode failure) and never initiates signing.
    pub fn check_is_authenticated(&self) -> bool {
        let Some(pubkey) = self.current_pubkey() else {
            return false;
        };
        let Some(session) = self.store.load() else {
            return false;
        };
        self.session_valid_at(&session, &pubkey, Utc::now().timestamp())
    }

    /// Drive the authentication flow for the current identity.
    ///
    /// No-op when already authenticated. On wallet failure the manager
    /// returns to `Unverified`; the error is logged, never raised.
    pub async fn authenticate(&self) {
        let Some(pubkey) = self.current_pubkey() else {
            debug!("authenticate requested without a connected wallet");
            self.set_state(AuthState::Disconnected);
            return;
        };

        if self.check_is_authenticated() {
            debug!(%pubkey, "cached session still valid, skipping signing");
            self.set_state(AuthState::Authenticated);
            return;
        }

        self.set_state(AuthState::Authenticating);
        let token = self.cancel.lock().unwrap().clone();

        match self.sign_and_persist(&pubkey, &token).await {
            Ok(true) => self.set_state(AuthState::Authenticated),
            // Cancelled by an identity change, which already reset the state.
            Ok(false) => debug!(%pubkey, "authentication abandoned after identity change"),
            Err(e) => {
                warn!(%pubkey, error = %e, "authentication failed");
                self.set_state(AuthState::Unverified);
            }
        }
    }

    /// Sign the canonical message and persist the session record.
    ///
    /// Returns `Ok(false)` when the cancellation token fired before the
    /// record could be written.
    async fn sign_and_persist(&self, pubkey: &str, token: &CancellationToken) -> Result<bool> {
        let canonical = message::canonicalize(&self.config.message, pubkey);

        let signature_bytes = tokio::select! {
            () = token.cancelled() => return Ok(false),
            result = self.wallet.sign_message(&canonical) => result?,
        };

        // The token may have fired between signing completion and this point.
        if token.is_cancelled() {
            return Ok(false);
        }

        let session = AuthSession {
            signature: codec::encode(&signature_bytes),
            pubkey: pubkey.to_string(),
            signed_at: Utc::now().timestamp(),
        };
        self.store.save(&session)?;
        info!(%pubkey, "session signed and persisted");
        Ok(true)
    }

    /// Spawned fire-and-forget form of [`authenticate`](Self::authenticate)
    /// for reactive hosts.
    pub fn spawn_authenticate(self: &Arc<Self>) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.authenticate().await;
        });
    }

    /// Raw read-through to the session store.
    ///
    /// Deliberately not filtered by current identity: the returned record
    /// may belong to a previously connected wallet.
    /// [`check_is_authenticated`](Self::check_is_authenticated) is the
    /// identity-aware check.
    pub fn auth_data(&self) -> Option<AuthSession> {
        self.store.load()
    }
}

#[async_trait]
impl SessionAuth for SessionManager {
    fn check_is_authenticated(&self) -> bool {
        SessionManager::check_is_authenticated(self)
    }

    async fn authenticate(&self) {
        SessionManager::authenticate(self).await;
    }

    fn auth_data(&self) -> Option<AuthSession> {
        SessionManager::auth_data(self)
    }
}
