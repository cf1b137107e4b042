//! Wire types shared by the daemon and the trigger client

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::net::IpAddr;
use std::time::Duration;

/// Outcome of a successful reconnect cycle
///
/// Serialized as the body of a `200 OK` response to `POST /reconnect`:
///
/// ```json
/// {"old_ip": "1.2.3.4", "new_ip": "5.6.7.8", "duration": 4213000000}
/// ```
///
/// `duration` is the elapsed time of the whole cycle in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectResult {
    /// Public IP before the cycle
    pub old_ip: IpAddr,
    /// Public IP after the cycle
    pub new_ip: IpAddr,
    /// Time from request admission to confirmation
    #[serde(serialize_with = "serialize_nanos", deserialize_with = "deserialize_nanos")]
    pub duration: Duration,
}

impl ReconnectResult {
    /// Create a new result
    pub fn new(old_ip: IpAddr, new_ip: IpAddr, duration: Duration) -> Self {
        Self {
            old_ip,
            new_ip,
            duration,
        }
    }
}

fn serialize_nanos<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
    serializer.serialize_u64(nanos)
}

fn deserialize_nanos<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let nanos = u64::deserialize(deserializer)?;
    Ok(Duration::from_nanos(nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_serialized_as_nanoseconds() {
        let result = ReconnectResult::new(
            IpAddr::from([1, 2, 3, 4]),
            IpAddr::from([5, 6, 7, 8]),
            Duration::from_millis(1_500),
        );

        let json = serde_json::to_value(result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "old_ip": "1.2.3.4",
                "new_ip": "5.6.7.8",
                "duration": 1_500_000_000u64,
            })
        );
    }

    #[test]
    fn test_parses_server_body() {
        let body = r#"{"old_ip":"2001:db8::1","new_ip":"2001:db8::2","duration":42}"#;
        let result: ReconnectResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.duration, Duration::from_nanos(42));
        assert!(result.new_ip.is_ipv6());
    }

    #[test]
    fn test_rejects_malformed_address() {
        let body = r#"{"old_ip":"nope","new_ip":"5.6.7.8","duration":1}"#;
        assert!(serde_json::from_str::<ReconnectResult>(body).is_err());
    }
}
