use chrono::{DateTime, Utc};
use chrono_tz::Tz;

const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Renders a UTC instant in the configured timezone for human readers.
pub fn format_local(at: DateTime<Utc>, tz: &Tz) -> String {
    at.with_timezone(tz).format(LOCAL_FORMAT).to_string()
}
