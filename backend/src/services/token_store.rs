//! In-memory store of issued check-in tokens.
//!
//! Every operation takes the same lock, so looking a token up, checking its
//! expiry and removing it happen as one step for concurrent callers. Expired
//! entries are removed whenever they are touched, and [`TokenStore::sweep_expired`]
//! reclaims the ones nobody touches.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::clock::Clock;
use crate::types::{SessionId, TokenTtl};

/// 128 bits.
pub const MIN_TOKEN_BYTES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token not found")]
    TokenNotFound,
    #[error("token expired")]
    TokenExpired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub expires_at: DateTime<Utc>,
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Copy)]
struct TokenEntry {
    expires_at: DateTime<Utc>,
    session_id: SessionId,
}

#[derive(Debug)]
pub struct TokenStore {
    entries: Mutex<HashMap<String, TokenEntry>>,
    clock: Arc<dyn Clock>,
    token_bytes: usize,
}

impl TokenStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_token_bytes(clock, MIN_TOKEN_BYTES)
    }

    /// `token_bytes` below [`MIN_TOKEN_BYTES`] is raised to the minimum.
    pub fn with_token_bytes(clock: Arc<dyn Clock>, token_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            token_bytes: token_bytes.max(MIN_TOKEN_BYTES),
        }
    }

    // A panic elsewhere while holding the lock must not wedge check-ins; the
    // map is always left consistent between statements.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, TokenEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// An expiry past the end of representable time is clamped to it.
    pub fn mint(&self, session_id: SessionId, ttl: TokenTtl) -> Token {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl.as_duration())
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut entries = self.entries();

        let mut value = generate_token_value(self.token_bytes);
        while entries.contains_key(&value) {
            value = generate_token_value(self.token_bytes);
        }

        entries.insert(
            value.clone(),
            TokenEntry {
                expires_at,
                session_id,
            },
        );

        Token {
            value,
            expires_at,
            session_id,
        }
    }

    /// Removes the token and returns its session if it was still live.
    ///
    /// Of any number of concurrent calls with the same token, at most one
    /// returns `Ok`; the rest see [`TokenError::TokenNotFound`].
    pub fn try_consume(&self, token: &str) -> Result<SessionId, TokenError> {
        let mut entries = self.entries();
        let now = self.clock.now();

        let entry = entries.remove(token).ok_or(TokenError::TokenNotFound)?;
        if entry.expires_at <= now {
            return Err(TokenError::TokenExpired);
        }
        Ok(entry.session_id)
    }

    /// Checks a token without consuming it. An expired entry is removed.
    pub fn peek(&self, token: &str) -> Result<SessionId, TokenError> {
        let mut entries = self.entries();
        let now = self.clock.now();

        let entry = *entries.get(token).ok_or(TokenError::TokenNotFound)?;
        if entry.expires_at <= now {
            entries.remove(token);
            return Err(TokenError::TokenExpired);
        }
        Ok(entry.session_id)
    }

    /// Drops every entry whose expiry has passed and returns how many went.
    pub fn sweep_expired(&self) -> usize {
        let mut entries = self.entries();
        let now = self.clock.now();

        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

fn generate_token_value(byte_len: usize) -> String {
    let mut bytes = vec![0u8; byte_len];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
