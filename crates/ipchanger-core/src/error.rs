//! Error types for the IP changer
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for IP changer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the IP changer
#[derive(Error, Debug)]
pub enum Error {
    /// Network or timeout failure talking to an echo service
    #[error("Transport error: {0}")]
    Transport(String),

    /// An echo service answered with something that is not an IP address
    #[error("Obtained invalid IP address: {0}")]
    InvalidAddress(String),

    /// Every resolution attempt failed at the transport level
    #[error("Failed to obtain IP address after {attempts} attempts")]
    ResolutionExhausted {
        /// Number of attempts made
        attempts: usize,
    },

    /// An echo service answered with a non-success status
    #[error("HTTP error: {0}")]
    Http(String),

    /// OS-level interface enable/disable/status failure
    #[error("Interface control error: {0}")]
    InterfaceControl(String),

    /// The interface did not report up within the polling budget
    #[error("Interface {interface} did not come up after {polls} status checks")]
    InterfaceNeverUp {
        /// Interface name
        interface: String,
        /// Number of status checks performed
        polls: u32,
    },

    /// The public IP stayed the same for every permitted reset cycle
    #[error("Public IP address unchanged after {cycles} reset cycles")]
    AddressUnchanged {
        /// Number of reset cycles performed
        cycles: u32,
    },

    /// A reconnect cycle is already running
    #[error("A reconnect cycle is already in progress")]
    Busy,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (spawning OS commands, sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an invalid address error
    pub fn invalid_address(candidate: impl Into<String>) -> Self {
        Self::InvalidAddress(candidate.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an interface control error
    pub fn interface_control(msg: impl Into<String>) -> Self {
        Self::InterfaceControl(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether a resolver may retry after this error
    ///
    /// Only transport failures are transient; everything else ends the
    /// attempt sequence immediately.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_is_transient() {
        assert!(Error::transport("timed out").is_transient());
        assert!(!Error::invalid_address("not-an-ip").is_transient());
        assert!(!Error::http("500 Internal Server Error").is_transient());
        assert!(!Error::ResolutionExhausted { attempts: 3 }.is_transient());
    }

    #[test]
    fn test_exhausted_message_names_attempts() {
        let err = Error::ResolutionExhausted { attempts: 3 };
        assert_eq!(err.to_string(), "Failed to obtain IP address after 3 attempts");
    }
}
