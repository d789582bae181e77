/*
[INPUT]:  Raw signature/public-key bytes or their base58 text form
[OUTPUT]: Base58 text or decoded bytes
[POS]:    Codec layer - fixed text encoding shared by store and verifier
[UPDATE]: When changing the text alphabet or key/signature formats
*/

use crate::error::Result;

/// Encode bytes into base58 text.
pub fn encode(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode base58 text back into bytes.
///
/// Fails with `SessionError::Decode` on characters outside the alphabet.
/// Callers treat a decode failure as "signature invalid", never as a crash.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    Ok(bs58::decode(text).into_vec()?)
}
