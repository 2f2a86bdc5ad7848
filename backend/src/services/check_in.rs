//! Check-in orchestration.
//!
//! A token moves through exactly one of these transitions:
//!
//! ```text
//! MINTED --(consumed, sink ok)------> RECORDED
//! MINTED --(consumed, sink fails)---> LOST      (logged, token already gone)
//! MINTED --(not found / expired)----> REJECTED
//! ```
//!
//! The token is consumed before the sink is called. A retried request can
//! therefore never record the same token twice, and a sink failure after
//! consumption loses that check-in for good.

use chrono_tz::Tz;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::models::{AttendanceRecord, Provenance, TokenIssuance};
use crate::services::attendance_sink::{AttendanceSink, SinkError};
use crate::services::session::SessionAuthority;
use crate::services::token_store::{TokenError, TokenStore, MIN_TOKEN_BYTES};
use crate::types::{SessionId, TokenTtl};
use crate::utils::redact;

#[derive(Debug, thiserror::Error)]
pub enum CheckInError {
    /// Covers both unknown and expired tokens so callers cannot tell which.
    #[error("invalid or expired token")]
    Unauthorized,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("attendance could not be recorded")]
    SinkUnavailable(#[source] SinkError),
}

impl From<TokenError> for CheckInError {
    fn from(_: TokenError) -> Self {
        CheckInError::Unauthorized
    }
}

#[derive(Debug, Clone)]
pub struct CheckInSettings {
    pub ttl: TokenTtl,
    pub token_bytes: usize,
    pub time_zone: Tz,
    /// When set, issued tokens include `{base}/check-in?token=...` for the QR code.
    pub check_in_base_url: Option<String>,
}

impl Default for CheckInSettings {
    fn default() -> Self {
        Self {
            ttl: TokenTtl::default(),
            token_bytes: MIN_TOKEN_BYTES,
            time_zone: chrono_tz::UTC,
            check_in_base_url: None,
        }
    }
}

pub struct CheckInService {
    store: Arc<TokenStore>,
    sessions: SessionAuthority,
    sink: Arc<dyn AttendanceSink>,
    clock: Arc<dyn Clock>,
    settings: CheckInSettings,
}

impl CheckInService {
    pub fn new(
        clock: Arc<dyn Clock>,
        sink: Arc<dyn AttendanceSink>,
        settings: CheckInSettings,
    ) -> Self {
        let store = Arc::new(TokenStore::with_token_bytes(
            clock.clone(),
            settings.token_bytes,
        ));
        Self {
            store,
            sessions: SessionAuthority::new(),
            sink,
            clock,
            settings,
        }
    }

    /// Shared handle for the background sweeper.
    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    pub fn ttl(&self) -> TokenTtl {
        self.settings.ttl
    }

    pub fn current_session(&self) -> SessionId {
        self.sessions.current()
    }

    pub fn rotate_session(&self) -> SessionId {
        self.sessions.rotate()
    }

    pub fn issue_token(&self) -> TokenIssuance {
        let swept = self.store.sweep_expired();
        if swept > 0 {
            tracing::debug!(swept, "Swept expired tokens before minting");
        }

        let token = self.store.mint(self.sessions.current(), self.settings.ttl);
        tracing::debug!(
            session_id = %token.session_id,
            token = %redact::token_suffix(&token.value),
            expires_at = %token.expires_at,
            "Issued check-in token"
        );

        let check_in_url = self
            .settings
            .check_in_base_url
            .as_deref()
            .map(|base| format!("{}/check-in?token={}", base.trim_end_matches('/'), token.value));

        TokenIssuance {
            token: token.value,
            expires_in: self.settings.ttl.as_secs(),
            expires_at: token.expires_at,
            session_id: token.session_id,
            check_in_url,
        }
    }

    /// Checks a token for the standalone validate endpoint. With `consume`
    /// the token is spent exactly as a check-in would spend it.
    pub fn validate_token(&self, token: &str, consume: bool) -> Result<SessionId, CheckInError> {
        let result = if consume {
            self.store.try_consume(token)
        } else {
            self.store.peek(token)
        };
        result.map_err(|err| {
            tracing::debug!(token = %redact::token_suffix(token), reason = %err, "Token rejected");
            CheckInError::from(err)
        })
    }

    /// Validates input and consumes the token. Once this returns `Ok` the
    /// token is gone; the returned [`PendingCheckIn`] still has to be
    /// delivered to the sink.
    pub fn begin_check_in(
        &self,
        token: &str,
        student_id: &str,
        provenance: Provenance,
    ) -> Result<PendingCheckIn, CheckInError> {
        let student_id = student_id.trim();
        if student_id.is_empty() {
            return Err(CheckInError::InvalidInput(
                "student_id must not be empty".to_string(),
            ));
        }

        let session_id = self.store.try_consume(token).map_err(|err| {
            tracing::info!(
                token = %redact::token_suffix(token),
                ip = %provenance.masked_ip(),
                reason = %err,
                "Check-in rejected"
            );
            CheckInError::from(err)
        })?;

        let record = AttendanceRecord::new(
            session_id,
            token,
            student_id,
            provenance,
            self.clock.now(),
            &self.settings.time_zone,
        );

        Ok(PendingCheckIn {
            record,
            sink: self.sink.clone(),
        })
    }

    /// Consumes the token and waits for the sink to accept the record.
    pub async fn check_in(
        &self,
        token: &str,
        student_id: &str,
        provenance: Provenance,
    ) -> Result<AttendanceRecord, CheckInError> {
        self.begin_check_in(token, student_id, provenance)?
            .deliver()
            .await
    }
}

/// A check-in whose token has been consumed but whose record has not yet
/// reached the sink.
pub struct PendingCheckIn {
    record: AttendanceRecord,
    sink: Arc<dyn AttendanceSink>,
}

impl PendingCheckIn {
    pub fn record(&self) -> &AttendanceRecord {
        &self.record
    }

    pub async fn deliver(self) -> Result<AttendanceRecord, CheckInError> {
        match self.sink.append(self.record.clone()).await {
            Ok(()) => {
                tracing::info!(
                    record_id = %self.record.id,
                    session_id = %self.record.session_id,
                    token = %self.record.token_suffix,
                    "Attendance recorded"
                );
                Ok(self.record)
            }
            Err(err) => {
                // The token is already spent; this check-in cannot be replayed.
                tracing::error!(
                    error = %err,
                    record_id = %self.record.id,
                    session_id = %self.record.session_id,
                    student_id = %self.record.student_id,
                    token = %self.record.token_suffix,
                    "Attendance lost: token consumed but sink append failed"
                );
                Err(CheckInError::SinkUnavailable(err))
            }
        }
    }

    /// Hands delivery to the tokio scheduler and returns immediately.
    /// Failures are logged by [`PendingCheckIn::deliver`].
    pub fn submit(self) -> (AttendanceRecord, JoinHandle<Result<AttendanceRecord, CheckInError>>) {
        let record = self.record.clone();
        let handle = tokio::spawn(self.deliver());
        (record, handle)
    }
}
