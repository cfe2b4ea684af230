// Authentication
//
// Two independent probes, combined at the end:
//   1. Login: POST the password to the login page and pick the PHP session
//      id out of `Set-Cookie`. A missing or unparseable cookie just leaves
//      the cookie dimension empty.
//   2. API key: call `recentBlocked` with the derived key. The appliance
//      answers exactly `[]` when it rejects the key.
// The whole sequence runs under the session's auth lock, so concurrent
// calls on one handle never interleave. Transport failures in either probe
// abort with the state left `Unauthenticated`.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::SET_COOKIE;
use secrecy::SecretString;
use tracing::{debug, info};

use crate::error::Error;
use crate::handle::Handle;
use crate::request::{key_probe_request, login_request};
use crate::session::{SessionKind, SessionState};
use crate::transport::RawResponse;

static SESSION_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"PHPSESSID=(\w+)").ok());

/// Find the PHP session id in a single `Set-Cookie` header value.
pub fn extract_session_id(set_cookie: &str) -> Option<String> {
    let re = SESSION_ID.as_ref()?;
    re.captures(set_cookie)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

fn session_id_from(response: &RawResponse) -> Option<SecretString> {
    response
        .headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(extract_session_id)
        .map(SecretString::from)
}

fn key_rejected(body: &[u8]) -> bool {
    body.trim_ascii() == b"[]"
}

impl Handle {
    /// Establish credentials for this handle.
    ///
    /// Restarts from `Unauthenticated`, runs the login and API-key probes,
    /// and stores whichever forms the appliance accepted. Only fails if a
    /// probe could not reach the appliance at all.
    pub async fn authenticate(&self) -> Result<SessionKind, Error> {
        let guard = self.session.begin_auth().await;
        self.session.store(&guard, SessionState::Unauthenticated);

        let base = self.base_url()?;
        let password = self
            .instance
            .password()
            .cloned()
            .unwrap_or_else(|| SecretString::from(""));

        let login = self
            .transport
            .perform(login_request(&base, &password)?)
            .await?;
        let session_id = session_id_from(&login);
        debug!(
            status = %login.status,
            cookie = session_id.is_some(),
            "login probe finished"
        );

        let api_key = self.instance.api_key();
        let probe = self
            .transport
            .perform(key_probe_request(&base, &api_key)?)
            .await?;
        let key_ok = !key_rejected(&probe.body);
        debug!(status = %probe.status, accepted = key_ok, "api key probe finished");

        let mut state = SessionState::Unauthenticated;
        if let Some(id) = session_id {
            state = state.with_session_id(id);
        }
        if key_ok {
            state = state.with_api_key(api_key);
        }

        let kind = state.kind();
        self.session.store(&guard, state);
        info!(host = self.instance.host(), session = %kind, "authenticated");
        Ok(kind)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn extracts_session_id_from_set_cookie() {
        assert_eq!(
            extract_session_id("PHPSESSID=k2b0rk9mt5q5a4lpl3tr5g0r81; path=/; HttpOnly").as_deref(),
            Some("k2b0rk9mt5q5a4lpl3tr5g0r81")
        );
        assert_eq!(extract_session_id("persistentlogin=abc; path=/"), None);
        assert_eq!(extract_session_id("PHPSESSID=; path=/"), None);
    }

    #[test]
    fn only_the_empty_array_rejects_a_key() {
        assert!(key_rejected(b"[]"));
        assert!(key_rejected(b"[]\n"));
        assert!(!key_rejected(br#"["ads.example.com"]"#));
        assert!(!key_rejected(b"ads.example.com"));
        assert!(!key_rejected(b""));
    }
}
