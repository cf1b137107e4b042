// # HTTP IP Resolver
//
// This crate provides the public IP resolver for the IP changer, backed by a
// pool of third-party echo services.
//
// ## Purpose
//
// Any single echo service may be unreachable or rate-limited, so every
// attempt draws one endpoint uniformly at random from the pool. Draws are
// independent: the same endpoint may be picked twice in one sequence.
//
// ## Retry Policy
//
// - Transport failure or timeout: log, back off, try again (bounded by `max_attempts`)
// - Non-success HTTP status: terminal, not retried
// - Malformed address: terminal, not retried
//
// ## Response Formats
//
// Echo services answer either with JSON (`{"origin": "1.2.3.4"}`, httpbin
// style) or with the bare address as text, optionally padded with whitespace.

use async_trait::async_trait;
use ipchanger_core::config::ResolverConfig;
use ipchanger_core::{Error, IpResolver, Result};
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// httpbin-style JSON answer
#[derive(Debug, Deserialize)]
struct OriginResponse {
    origin: String,
}

/// Echo-service backed public IP resolver
#[derive(Debug, Clone)]
pub struct HttpIpResolver {
    /// Echo service URLs
    endpoints: Vec<String>,

    /// Maximum number of lookups per resolve() call
    max_attempts: usize,

    /// Pause after a transport failure
    backoff: Duration,

    /// HTTP client (carries the per-request timeout)
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a resolver over `endpoints` with default retry settings
    pub fn new(endpoints: Vec<String>) -> Result<Self> {
        Self::from_config(&ResolverConfig {
            endpoints,
            ..ResolverConfig::default()
        })
    }

    /// Create a resolver from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the endpoint pool is empty or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoints: config.endpoints.clone(),
            max_attempts: config.max_attempts,
            backoff: config.backoff(),
            client,
        })
    }

    /// Endpoint pool
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Draw one endpoint uniformly at random
    fn pick_endpoint(&self) -> &str {
        self.endpoints
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            // Pool is validated non-empty at construction
            .unwrap_or_default()
    }

    /// Query one endpoint
    ///
    /// Transport failures come back as [`Error::Transport`] so the caller can
    /// retry them; everything else is terminal.
    async fn query(&self, url: &str) -> Result<IpAddr> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::transport(format!("Request to {} timed out", url))
            } else {
                Error::transport(format!("Request to {} failed: {}", url, e))
            }
        })?;

        if !response.status().is_success() {
            return Err(Error::http(format!(
                "Failed to obtain IP address from {}, status code: {}",
                url,
                response.status().as_u16()
            )));
        }

        // Reading the body is not retried: the service answered, it just broke mid-way
        let body = response.text().await.map_err(|e| {
            Error::Other(format!("Could not read response body from {}: {}", url, e))
        })?;

        parse_response_body(&body)
    }
}

/// Extract the address from an echo-service response body
///
/// JSON bodies with an `origin` field take precedence; anything else is
/// treated as plain text. Surrounding whitespace is trimmed in both cases.
///
/// # Errors
///
/// [`Error::InvalidAddress`] if the candidate is not an IPv4 or IPv6 literal.
pub fn parse_response_body(body: &str) -> Result<IpAddr> {
    let candidate = match serde_json::from_str::<OriginResponse>(body) {
        Ok(parsed) => {
            debug!("Echo response is JSON, using origin field");
            parsed.origin.trim().to_string()
        }
        Err(e) => {
            debug!("Echo response is not JSON ({}), using plain text", e);
            body.trim().to_string()
        }
    };

    candidate
        .parse::<IpAddr>()
        .map_err(|_| Error::invalid_address(candidate))
}

#[async_trait]
impl IpResolver for HttpIpResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        for attempt in 1..=self.max_attempts {
            let url = self.pick_endpoint();
            info!(
                "Getting the current IP address via {} (attempt {}/{})",
                url, attempt, self.max_attempts
            );

            match self.query(url).await {
                Ok(ip) => {
                    info!("Received IP address {} from {}", ip, url);
                    return Ok(ip);
                }
                Err(e) if e.is_transient() => {
                    warn!("Attempt {}: failed to obtain IP address: {}", attempt, e);
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::ResolutionExhausted {
            attempts: self.max_attempts,
        })
    }

    fn resolver_name(&self) -> &'static str {
        "http"
    }
}
