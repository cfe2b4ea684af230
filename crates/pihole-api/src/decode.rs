// Result decoding
//
// Single chokepoint for every structured response. The Pi-hole answers
// "authentication required" with HTTP 200 and an empty JSON array, so that
// sentinel is checked before the real decode on every body.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Error;

/// `true` if `body` is the appliance's "authentication required" sentinel:
/// any JSON array with no elements.
pub fn is_auth_sentinel(body: &[u8]) -> bool {
    serde_json::from_slice::<Vec<serde_json::Value>>(body).is_ok_and(|v| v.is_empty())
}

/// Decode a response body into `T`, raising
/// [`Error::AuthenticationRequired`] for the sentinel regardless of `T`.
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    if is_auth_sentinel(body) {
        debug!("response is the authentication-required sentinel");
        return Err(Error::AuthenticationRequired);
    }
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "response did not match the expected shape");
        Error::Decoding(Some(e))
    })
}

/// Pull the single payload out of a `{ "<key>": payload }` envelope.
///
/// A missing key is a decode failure with no underlying cause.
pub fn unwrap_envelope<T>(mut envelope: HashMap<String, T>, key: &str) -> Result<T, Error> {
    envelope.remove(key).ok_or_else(|| {
        debug!(key, "response envelope is missing its payload key");
        Error::unexpected_shape()
    })
}
