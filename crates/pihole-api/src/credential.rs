// Credential derivation
//
// The Pi-hole's key-based endpoints accept a token derived from the web
// password: lowercase hex of SHA-256 over the lowercase hex of SHA-256 over
// the password bytes. Both hex steps matter -- hashing the raw inner digest
// instead of its hex string yields a token the appliance rejects.

use secrecy::SecretString;
use sha2::{Digest, Sha256};

/// Derive the API key (`auth` query value) for a web password.
///
/// Pure and deterministic. An empty password still produces a token (the
/// hash of the empty string), so a present key is no proof that a password
/// was configured.
pub fn derive_api_key(password: &str) -> SecretString {
    let inner = hex_sha256(password.as_bytes());
    SecretString::from(hex_sha256(inner.as_bytes()))
}

fn hex_sha256(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}
