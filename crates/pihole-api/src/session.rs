// Session state
//
// Tracks which credential material is currently usable for decorating
// requests: a login cookie, a verified API key, both, or neither. Only values
// the appliance confirmed are ever stored.

use std::sync::Arc;

use arc_swap::ArcSwap;
use secrecy::SecretString;
use tokio::sync::{Mutex, MutexGuard};

/// Name of the PHP session cookie issued by the Pi-hole login page.
pub const SESSION_COOKIE: &str = "PHPSESSID";

/// Which credential forms a session currently holds.
///
/// Marker enum (no data) -- the secrets themselves live in [`SessionState`].
/// Useful for logging and assertions without exposing credential material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SessionKind {
    Unauthenticated,
    CookieOnly,
    ApiKeyOnly,
    Both,
}

/// Credential material available for request decoration.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// No credential material held.
    #[default]
    Unauthenticated,
    /// Session id from a successful login.
    CookieOnly { session_id: SecretString },
    /// Derived API key that passed the verification probe.
    ApiKeyOnly { api_key: SecretString },
    /// Both credential forms available.
    Both {
        session_id: SecretString,
        api_key: SecretString,
    },
}

impl SessionState {
    pub fn kind(&self) -> SessionKind {
        match self {
            Self::Unauthenticated => SessionKind::Unauthenticated,
            Self::CookieOnly { .. } => SessionKind::CookieOnly,
            Self::ApiKeyOnly { .. } => SessionKind::ApiKeyOnly,
            Self::Both { .. } => SessionKind::Both,
        }
    }

    /// Record an accepted login cookie.
    pub fn with_session_id(self, session_id: SecretString) -> Self {
        match self {
            Self::Unauthenticated | Self::CookieOnly { .. } => Self::CookieOnly { session_id },
            Self::ApiKeyOnly { api_key } | Self::Both { api_key, .. } => Self::Both {
                session_id,
                api_key,
            },
        }
    }

    /// Record an API key that passed verification.
    pub fn with_api_key(self, api_key: SecretString) -> Self {
        match self {
            Self::Unauthenticated | Self::ApiKeyOnly { .. } => Self::ApiKeyOnly { api_key },
            Self::CookieOnly { session_id } | Self::Both { session_id, .. } => Self::Both {
                session_id,
                api_key,
            },
        }
    }

    pub fn session_id(&self) -> Option<&SecretString> {
        match self {
            Self::CookieOnly { session_id } | Self::Both { session_id, .. } => Some(session_id),
            Self::Unauthenticated | Self::ApiKeyOnly { .. } => None,
        }
    }

    pub fn api_key(&self) -> Option<&SecretString> {
        match self {
            Self::ApiKeyOnly { api_key } | Self::Both { api_key, .. } => Some(api_key),
            Self::Unauthenticated | Self::CookieOnly { .. } => None,
        }
    }
}

/// Per-handle session storage.
///
/// Reads are lock-free snapshots; writers must hold the authentication guard
/// so that concurrent `authenticate()` calls never interleave.
#[derive(Debug, Default)]
pub(crate) struct SessionCell {
    current: ArcSwap<SessionState>,
    auth_lock: Mutex<()>,
}

impl SessionCell {
    pub(crate) fn load(&self) -> Arc<SessionState> {
        self.current.load_full()
    }

    /// Serialize an authentication attempt. Hold the guard for the whole
    /// probe-and-combine sequence.
    pub(crate) async fn begin_auth(&self) -> MutexGuard<'_, ()> {
        self.auth_lock.lock().await
    }

    pub(crate) fn store(&self, _guard: &MutexGuard<'_, ()>, state: SessionState) {
        self.current.store(Arc::new(state));
    }
}
