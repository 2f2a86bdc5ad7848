pub mod csv;
pub mod redact;
pub mod time;
