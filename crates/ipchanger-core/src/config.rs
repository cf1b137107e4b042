//! Configuration types for the IP changer
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Echo services queried when no endpoint list is configured
pub const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://wtfismyip.com/text",
    "https://api.ipify.org",
    "https://checkip.amazonaws.com",
    "https://ipecho.net/plain",
    "https://httpbin.org/ip",
    "https://ipnr.dk",
    "https://icanhazip.com",
];

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Interface to reset (e.g., "pppoe")
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Address the HTTP surface listens on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// IP resolver settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Reconnect cycle settings
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

impl ServiceConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            interface: default_interface(),
            listen_addr: default_listen_addr(),
            resolver: ResolverConfig::default(),
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interface.trim().is_empty() {
            return Err(crate::Error::config("Interface name cannot be empty"));
        }
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(crate::Error::config(format!(
                "Listen address is not a socket address: {}",
                self.listen_addr
            )));
        }

        self.resolver.validate()?;
        self.reconnect.validate()?;

        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// IP resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Echo service URLs; one is drawn at random for every attempt
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// Maximum number of lookups before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Timeout for a single lookup (in milliseconds)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Pause after a transport failure (in milliseconds)
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl ResolverConfig {
    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.endpoints.is_empty() {
            return Err(crate::Error::config("Endpoint pool cannot be empty"));
        }
        for url in &self.endpoints {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(crate::Error::config(format!(
                    "Endpoint must use HTTP or HTTPS scheme. Got: {}",
                    url
                )));
            }
        }
        if self.max_attempts == 0 {
            return Err(crate::Error::config("Resolver max_attempts must be > 0"));
        }
        if self.request_timeout_ms == 0 {
            return Err(crate::Error::config("Resolver request timeout must be > 0"));
        }
        Ok(())
    }

    /// Timeout for a single lookup
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Pause after a transport failure
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            max_attempts: default_max_attempts(),
            request_timeout_ms: default_request_timeout_ms(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

/// What happens to a reconnect request that arrives while a cycle is running
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Admission {
    /// Wait for the running cycle, then start a new one
    #[default]
    Queue,
    /// Fail immediately with [`crate::Error::Busy`]
    Reject,
}

impl std::str::FromStr for Admission {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "queue" => Ok(Admission::Queue),
            "reject" => Ok(Admission::Reject),
            other => Err(crate::Error::config(format!(
                "Unknown admission policy '{}'. Valid: queue, reject",
                other
            ))),
        }
    }
}

/// Reconnect cycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Pause between the interface coming up and the IP check (in milliseconds)
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Interval between interface status checks (in milliseconds)
    #[serde(default = "default_up_poll_interval_ms")]
    pub up_poll_interval_ms: u64,

    /// Maximum number of status checks before the interface is declared dead
    #[serde(default = "default_max_up_polls")]
    pub max_up_polls: u32,

    /// Maximum number of reset cycles per request
    ///
    /// `None` keeps resetting until the public IP changes.
    #[serde(default)]
    pub max_cycles: Option<u32>,

    /// Handling of requests that arrive during a running cycle
    #[serde(default)]
    pub admission: Admission,

    /// Capacity of the cycle event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl ReconnectConfig {
    /// Validate the reconnect configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.max_up_polls == 0 {
            return Err(crate::Error::config("max_up_polls must be > 0"));
        }
        if self.max_cycles == Some(0) {
            return Err(crate::Error::config("max_cycles must be > 0 when set"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event_channel_capacity must be > 0"));
        }
        Ok(())
    }

    /// Pause between the interface coming up and the IP check
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Interval between interface status checks
    pub fn up_poll_interval(&self) -> Duration {
        Duration::from_millis(self.up_poll_interval_ms)
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            up_poll_interval_ms: default_up_poll_interval_ms(),
            max_up_polls: default_max_up_polls(),
            max_cycles: None,
            admission: Admission::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_interface() -> String {
    "pppoe".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:4782".to_string()
}

fn default_endpoints() -> Vec<String> {
    DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect()
}

fn default_max_attempts() -> usize {
    3
}

fn default_request_timeout_ms() -> u64 {
    3_000
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_settle_delay_ms() -> u64 {
    1_000
}

fn default_up_poll_interval_ms() -> u64 {
    1_000
}

fn default_max_up_polls() -> u32 {
    60
}

fn default_event_channel_capacity() -> usize {
    100
}
