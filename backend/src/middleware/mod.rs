pub mod cors;
pub mod logging;
pub mod provenance;
pub mod rate_limit;
pub mod request_id;

pub use cors::*;
pub use logging::*;
pub use rate_limit::*;
pub use request_id::*;
