/*
[INPUT]:  Connection state and message bytes to sign
[OUTPUT]: Public key exposure and detached signatures
[POS]:    Wallet layer - abstraction over the external signing capability
[UPDATE]: When adding new wallet transports or changing the signing contract
*/

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;

use crate::error::{Result, SessionError};

/// Trait for the external wallet capability.
///
/// The crate never holds a private key; it only observes the connection
/// state and public key, and asks the wallet to sign bytes. The trait is
/// async to support hardware wallets and browser extension transports.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Whether a wallet is currently connected
    fn connected(&self) -> bool;

    /// Public key of the connected wallet, if any
    fn public_key(&self) -> Option<[u8; 32]>;

    /// Sign a message and return the detached signature bytes
    ///
    /// Fails with `WalletUnavailable` if signing support is absent and
    /// `SigningRejected` if the user declines the request.
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// In-process Ed25519 wallet for tests and demos.
///
/// Holds its own keypair and signs immediately. `connect`, `disconnect`
/// and `set_keypair` simulate the identity changes a real wallet emits.
pub struct KeypairWallet {
    signing_key: RwLock<SigningKey>,
    connected: AtomicBool,
}

impl KeypairWallet {
    /// Create a connected wallet with a fresh random keypair.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Create a connected wallet from an existing signing key.
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        Self {
            signing_key: RwLock::new(signing_key),
            connected: AtomicBool::new(true),
        }
    }

    /// Mark the wallet as connected.
    pub fn connect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    /// Mark the wallet as disconnected. The keypair is retained.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Swap in a different keypair, simulating an account switch.
    pub fn set_keypair(&self, signing_key: SigningKey) {
        *self.signing_key.write().unwrap() = signing_key;
    }
}

#[async_trait]
impl WalletAdapter for KeypairWallet {
    fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn public_key(&self) -> Option<[u8; 32]> {
        if !self.connected() {
            return None;
        }
        Some(self.signing_key.read().unwrap().verifying_key().to_bytes())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        if !self.connected() {
            return Err(SessionError::WalletUnavailable(
                "wallet is disconnected".to_string(),
            ));
        }
        let signature = self.signing_key.read().unwrap().sign(message);
        Ok(signature.to_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier};

    #[tokio::test]
    async fn test_keypair_wallet_signs() {
        let wallet = KeypairWallet::generate();
        assert!(wallet.connected());

        let pubkey = wallet.public_key().unwrap();
        let message = b"test message";
        let signature_bytes = wallet.sign_message(message).await.unwrap();

        let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(&pubkey).unwrap();
        let signature = Signature::from_slice(&signature_bytes).unwrap();
        assert!(verifying_key.verify(message, &signature).is_ok());
    }

    #[tokio::test]
    async fn test_disconnected_wallet_is_unavailable() {
        let wallet = KeypairWallet::generate();
        wallet.disconnect();

        assert!(wallet.public_key().is_none());
        let err = wallet.sign_message(b"test").await.unwrap_err();
        assert!(err.is_wallet_error());
    }

    #[test]
    fn test_set_keypair_changes_identity() {
        let wallet = KeypairWallet::generate();
        let before = wallet.public_key().unwrap();
        wallet.set_keypair(SigningKey::generate(&mut OsRng));
        assert_ne!(wallet.public_key().unwrap(), before);
    }
}
