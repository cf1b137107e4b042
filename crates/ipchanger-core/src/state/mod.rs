//! Reconnect service state
//!
//! The only mutable state in the service is the last confirmed public IP.

pub mod last_known;

pub use last_known::LastKnownIp;
