use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SessionId;

/// A freshly minted token, ready to be rendered into a QR code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenIssuance {
    pub token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
    pub session_id: SessionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenValidationResponse {
    pub status: String,
    pub session_id: SessionId,
    pub consumed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
}
