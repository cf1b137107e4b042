// # ipchanger-core
//
// Core library for the IP changer reconnect service.
//
// ## Architecture Overview
//
// This library provides the pieces that make up one "reconnect and confirm"
// operation:
// - **IpResolver**: Trait for learning the current public IP address
// - **InterfaceController**: Trait for cycling a network interface down and up
// - **ReconnectOrchestrator**: State machine that resets the interface until
//   the public IP changes
// - **LastKnownIp**: The most recently confirmed public address, owned by the
//   orchestrator
//
// ## Design Principles
//
// 1. **Separation of Concerns**: OS and HTTP specifics live in their own crates
// 2. **Single Flight**: At most one reconnect cycle touches the interface at a time
// 3. **Library-First**: The daemon is a thin shell around this crate

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod state;
pub mod types;

// Re-export core types for convenience
pub use traits::{InterfaceController, IpResolver};
pub use engine::{CycleEvent, CycleState, ReconnectOrchestrator};
pub use config::{Admission, ReconnectConfig, ResolverConfig, ServiceConfig};
pub use error::{Error, Result};
pub use state::LastKnownIp;
pub use types::ReconnectResult;
