use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use parking_lot::RwLock;
use serde_json::Value;

use crate::core::Record;

#[derive(Debug, Clone, Default)]
struct AuthState {
    token: String,
    record: Option<Record>,
}

/// In-process session store for a PocketBase client.
///
/// Shared by every clone of the client; the lock is only held to copy the
/// token in or out, never across a request.
#[derive(Debug, Default)]
pub struct AuthStore {
    state: RwLock<AuthState>,
}

impl AuthStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        let state = self.state.read();
        (!state.token.is_empty()).then(|| state.token.clone())
    }

    /// Authenticated admin/superuser record, if the login returned one
    #[must_use]
    pub fn record(&self) -> Option<Record> {
        self.state.read().record.clone()
    }

    pub fn save(&self, token: impl Into<String>, record: Option<Record>) {
        let mut state = self.state.write();
        state.token = token.into();
        state.record = record;
    }

    pub fn clear(&self) {
        *self.state.write() = AuthState::default();
    }

    /// True when a token is stored and it is not an expired JWT.
    ///
    /// Tokens whose payload cannot be decoded count as invalid; a decodable
    /// payload without `exp` counts as valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let state = self.state.read();
        !state.token.is_empty() && !is_token_expired(&state.token)
    }
}

fn is_token_expired(token: &str) -> bool {
    let Some(payload) = token_payload(token) else {
        return true;
    };
    match payload.get("exp").and_then(Value::as_i64) {
        Some(exp) => exp <= chrono::Utc::now().timestamp(),
        None => false,
    }
}

fn token_payload(token: &str) -> Option<serde_json::Map<String, Value>> {
    let encoded = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(encoded.trim_end_matches('=')).ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(payload) if !payload.is_empty() => Some(payload),
        _ => None,
    }
}
