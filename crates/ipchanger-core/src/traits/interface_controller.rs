// # Interface Controller Trait
//
// Defines the interface for driving a named network interface through a
// down/up cycle.
//
// ## Implementations
//
// - OpenWrt netifd (`ifdown`/`ifup`/`ifstatus`): `ipchanger-iface-netifd` crate
//
// ## Usage
//
// ```rust,ignore
// use ipchanger_core::InterfaceController;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let controller = /* InterfaceController implementation */;
//
//     controller.reset("pppoe").await?;
//     while !controller.is_up("pppoe").await? {
//         tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for interface controller implementations
///
/// # Concurrency
///
/// Both operations act on a single physical OS resource. Two overlapping
/// down/up cycles on the same interface race, so callers must serialize
/// access. [`crate::ReconnectOrchestrator`] does this with its cycle lock;
/// implementations do not lock on their own.
///
/// # Liveness
///
/// `reset` returns once the enable step has been issued. It does not wait
/// for the interface to come up; callers poll [`InterfaceController::is_up`].
#[async_trait]
pub trait InterfaceController: Send + Sync {
    /// Disable, then enable the interface
    ///
    /// Either step failing aborts with a descriptive
    /// [`crate::Error::InterfaceControl`]. No step is retried.
    async fn reset(&self, interface: &str) -> Result<(), crate::Error>;

    /// Whether the interface is currently up
    async fn is_up(&self, interface: &str) -> Result<bool, crate::Error>;

    /// Name of the controller, used in logs
    fn controller_name(&self) -> &'static str;
}
