/*
[INPUT]:  Base58 signature, base58 public key, canonical message bytes
[OUTPUT]: Boolean verification outcome
[POS]:    Verification layer - detached Ed25519 check, no private key involved
[UPDATE]: When changing signature algorithm or encoding
*/

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use tracing::debug;

use crate::codec;

/// Verify a detached Ed25519 signature over exactly `canonical_bytes`.
///
/// Both inputs are base58 text; any decode failure, wrong length, or
/// non-canonical key is reported as `false` rather than an error. Pure
/// function, no side effects.
pub fn verify_signature(signature_b58: &str, pubkey_b58: &str, canonical_bytes: &[u8]) -> bool {
    let Ok(signature_bytes) = codec::decode(signature_b58) else {
        debug!("signature is not valid base58");
        return false;
    };
    let Ok(pubkey_bytes) = codec::decode(pubkey_b58) else {
        debug!("pubkey is not valid base58");
        return false;
    };

    let Ok(signature) = Signature::from_slice(&signature_bytes) else {
        debug!(len = signature_bytes.len(), "signature has wrong length");
        return false;
    };
    let Ok(key_array) = <[u8; 32]>::try_from(pubkey_bytes.as_slice()) else {
        debug!(len = pubkey_bytes.len(), "pubkey has wrong length");
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&key_array) else {
        debug!("pubkey bytes are not a valid curve point");
        return false;
    };

    verifying_key.verify(canonical_bytes, &signature).is_ok()
}
