pub mod id;
pub mod ttl;

pub use id::*;
pub use ttl::*;
