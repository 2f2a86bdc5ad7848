pub mod attendance_sink;
pub mod check_in;
pub mod csv_sink;
pub mod session;
pub mod sweeper;
pub mod token_store;

pub use attendance_sink::{AttendanceSink, MemorySink, SinkError};
pub use check_in::{CheckInError, CheckInService, CheckInSettings, PendingCheckIn};
pub use csv_sink::CsvFileSink;
pub use session::SessionAuthority;
pub use token_store::{Token, TokenError, TokenStore};
