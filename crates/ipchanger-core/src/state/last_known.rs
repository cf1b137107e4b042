// # Last Known IP
//
// The most recently confirmed public IP address.
//
// ## Ownership
//
// A single `LastKnownIp` lives inside the `ReconnectOrchestrator`, behind the
// same mutex that serializes reconnect cycles. It is never shared as a global.
//
// ## Crash Behavior
//
// - State is held in memory only
// - After a restart the initial resolution establishes a fresh baseline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Last confirmed public IP address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastKnownIp {
    /// The confirmed address
    pub ip: IpAddr,
    /// When the address was confirmed
    pub confirmed_at: DateTime<Utc>,
}

impl LastKnownIp {
    /// Record an address confirmed now
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            confirmed_at: Utc::now(),
        }
    }

    /// Whether `candidate` differs from the confirmed address
    pub fn has_changed(&self, candidate: IpAddr) -> bool {
        self.ip != candidate
    }

    /// Replace the confirmed address, returning the previous one
    pub(crate) fn replace(&mut self, ip: IpAddr) -> IpAddr {
        let previous = self.ip;
        self.ip = ip;
        self.confirmed_at = Utc::now();
        previous
    }
}
