use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{RecordId, SessionId};
use crate::utils::{redact, time};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    #[default]
    Present,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
        }
    }
}

/// Where a check-in request came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
}

impl Provenance {
    /// Client address truncated to its network prefix, for log lines.
    pub fn masked_ip(&self) -> String {
        self.ip
            .as_deref()
            .map(redact::mask_ip)
            .unwrap_or_else(|| "-".to_string())
    }
}

/// One successful check-in. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub recorded_at: DateTime<Utc>,
    pub recorded_at_epoch: i64,
    pub recorded_at_local: String,
    pub session_id: SessionId,
    /// Last characters of the consumed token; the full value is never stored.
    pub token_suffix: String,
    pub student_id: String,
    pub status: AttendanceStatus,
    pub provenance: Provenance,
}

impl AttendanceRecord {
    pub fn new(
        session_id: SessionId,
        token: &str,
        student_id: &str,
        provenance: Provenance,
        recorded_at: DateTime<Utc>,
        time_zone: &Tz,
    ) -> Self {
        Self {
            id: RecordId::new(),
            recorded_at,
            recorded_at_epoch: recorded_at.timestamp(),
            recorded_at_local: time::format_local(recorded_at, time_zone),
            session_id,
            token_suffix: redact::token_suffix(token),
            student_id: student_id.to_string(),
            status: AttendanceStatus::default(),
            provenance,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckInRequest {
    #[validate(length(min = 1, max = 256, message = "Token is required"))]
    pub token: String,
    #[validate(length(max = 128, message = "Student ID is too long"))]
    pub student_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// The sink accepted the record before the response was sent.
    Recorded,
    /// The record was handed to a background task for appending.
    Submitted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub delivery: DeliveryState,
    pub record: AttendanceRecord,
}
