// # IP Resolver Trait
//
// Defines the interface for discovering the caller's current public IP.
//
// ## Implementations
//
// - Echo-service based: `ipchanger-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ipchanger_core::IpResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* IpResolver implementation */;
//
//     let public_ip = resolver.resolve().await?;
//     println!("Public IP: {}", public_ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for public IP resolver implementations
///
/// Implementations must be thread-safe and usable across async tasks.
/// Resolvers are stateless from the orchestrator's point of view: any two
/// calls may run concurrently and neither touches the managed interface.
///
/// # Retry Ownership
///
/// Unlike the orchestrator, a resolver owns its own retry loop: transport
/// failures against one echo service are retried against another service,
/// bounded by the configured attempt budget. Non-transport failures
/// (non-success status, malformed address) end the call immediately.
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Resolve the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: A syntactically valid IPv4 or IPv6 address
    /// - `Err(Error)`: If every attempt failed or a terminal error occurred
    async fn resolve(&self) -> Result<IpAddr, crate::Error>;

    /// Name of the resolver, used in logs
    fn resolver_name(&self) -> &'static str;
}
