//! Core traits for the IP changer
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpResolver`]: Learn the current public IP address
//! - [`InterfaceController`]: Cycle a network interface and query its status

pub mod ip_resolver;
pub mod interface_controller;

pub use ip_resolver::IpResolver;
pub use interface_controller::InterfaceController;
