/*
[INPUT]:  Message template (JSON object) and signer public key (base58)
[OUTPUT]: Canonical byte payload for signing and verification
[POS]:    Canonicalization layer - both sides must agree on these bytes
[UPDATE]: When the reserved field name or serialization form changes
*/

use serde_json::Value;

/// Reserved field the signer's public key is injected under.
pub const PUBKEY_FIELD: &str = "publicKey";

/// Build the canonical byte payload for a message template and public key.
///
/// The public key is injected under [`PUBKEY_FIELD`] only if the template
/// does not already carry that field; a caller-supplied value is preserved
/// verbatim. Serialization uses serde_json's default map type, which keeps
/// object keys sorted, so identical `(template, pubkey)` pairs always yield
/// identical bytes. Signing and verification both go through this function.
pub fn canonicalize(template: &Value, pubkey_base58: &str) -> Vec<u8> {
    let mut message = template.clone();
    if let Value::Object(map) = &mut message {
        map.entry(PUBKEY_FIELD.to_string())
            .or_insert_with(|| Value::String(pubkey_base58.to_string()));
    }
    // Value serialization cannot fail for tree-shaped JSON.
    serde_json::to_string(&message)
        .unwrap_or_default()
        .into_bytes()
}
