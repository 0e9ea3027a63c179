//! Client-held authentication session.
//!
//! The session lives in a [`SessionStore`], a string key-value store standing in for browser
//! local storage, so a CLI or server-rendered client can swap in its own backing.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// Key holding the serialized session.
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Key holding the CSRF `state` of an in-flight OAuth login.
pub const OAUTH_STATE_KEY: &str = "oauth_state";

pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}

/// Tokens obtained from the OAuth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix epoch milliseconds.
    pub expires_at: i64,
    #[serde(default)]
    pub user: Value,
}

impl OAuthTokens {
    /// Reads a stored blob field by field. A missing or non-numeric `expiresAt` reads as 0, so
    /// the session counts as expired.
    fn from_stored(blob: &Map<String, Value>) -> Self {
        let text = |key: &str| blob.get(key).and_then(Value::as_str).map(String::from);
        let expires_at = blob
            .get("expiresAt")
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|ms| ms as i64)))
            .unwrap_or(0);

        OAuthTokens {
            access_token: text("accessToken").unwrap_or_default(),
            refresh_token: text("refreshToken"),
            expires_at,
            user: blob.get("user").cloned().unwrap_or(Value::Null),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthSession {
    /// A pre-encoded credential with no expiry.
    Opaque(String),
    OAuth(OAuthTokens),
}

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

impl AuthSession {
    /// Reads the stored session. A JSON object is an OAuth session; anything else is opaque.
    pub fn load(store: &dyn SessionStore) -> Option<Self> {
        let raw = store.get(AUTH_TOKEN_KEY)?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(blob)) => Some(AuthSession::OAuth(OAuthTokens::from_stored(&blob))),
            _ => Some(AuthSession::Opaque(raw)),
        }
    }

    pub fn save(&self, store: &dyn SessionStore) -> Result<(), serde_json::Error> {
        let raw = match self {
            AuthSession::Opaque(token) => token.clone(),
            AuthSession::OAuth(tokens) => serde_json::to_string(tokens)?,
        };
        store.set(AUTH_TOKEN_KEY, raw);
        Ok(())
    }

    /// Logs out: drops the session and any pending OAuth state.
    pub fn clear(store: &dyn SessionStore) {
        store.remove(AUTH_TOKEN_KEY);
        store.remove(OAUTH_STATE_KEY);
    }

    pub fn is_authenticated_at(&self, now_ms: i64) -> bool {
        match self {
            AuthSession::Opaque(token) => !token.is_empty(),
            AuthSession::OAuth(tokens) => tokens.expires_at > now_ms,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(now_millis())
    }

    /// The credential sent after `Basic ` on write requests.
    pub fn access_token(&self) -> &str {
        match self {
            AuthSession::Opaque(token) => token,
            AuthSession::OAuth(tokens) => &tokens.access_token,
        }
    }

    pub fn authorization_header(&self) -> String {
        format!("Basic {}", self.access_token())
    }
}
