//! Data models shared across the check-in core and API handlers.

pub mod attendance;
pub mod token;

pub use attendance::{AttendanceRecord, AttendanceStatus, Provenance};
pub use token::TokenIssuance;
