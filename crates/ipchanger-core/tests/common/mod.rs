//! Test doubles and common utilities for reconnect contract tests
//!
//! This module provides minimal test doubles that record how the
//! orchestrator drives its collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use ipchanger_core::error::{Error, Result};
use ipchanger_core::{InterfaceController, IpResolver, ServiceConfig};
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Counters shared between a [`RecordingController`] and the test
#[derive(Default)]
pub struct ControllerProbe {
    /// Call counter for reset()
    reset_calls: AtomicUsize,
    /// Call counter for is_up()
    status_calls: AtomicUsize,
    /// Set while a reset is running
    in_reset: AtomicBool,
    /// Set if a reset started while another was running
    overlap_detected: AtomicBool,
    /// Interface names passed to reset()
    interfaces: Mutex<Vec<String>>,
}

impl ControllerProbe {
    /// Get the number of times reset() was called
    pub fn reset_calls(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }

    /// Get the number of times is_up() was called
    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Whether two resets ever ran at the same time
    pub fn overlap_detected(&self) -> bool {
        self.overlap_detected.load(Ordering::SeqCst)
    }

    /// Interface names passed to reset()
    pub fn interfaces(&self) -> Vec<String> {
        self.interfaces.lock().unwrap().clone()
    }
}

/// An InterfaceController that records calls and asserts exclusive access
pub struct RecordingController {
    probe: Arc<ControllerProbe>,
    /// How long each reset takes
    reset_delay: Duration,
    /// Fail every reset with this message
    fail_reset: Option<&'static str>,
}

impl RecordingController {
    /// Create a controller whose resets always succeed
    pub fn new() -> (Self, Arc<ControllerProbe>) {
        Self::build(Duration::from_millis(0), None)
    }

    /// Create a controller whose resets take `delay`
    pub fn slow(delay: Duration) -> (Self, Arc<ControllerProbe>) {
        Self::build(delay, None)
    }

    /// Create a controller whose resets always fail
    pub fn failing(message: &'static str) -> (Self, Arc<ControllerProbe>) {
        Self::build(Duration::from_millis(0), Some(message))
    }

    fn build(
        reset_delay: Duration,
        fail_reset: Option<&'static str>,
    ) -> (Self, Arc<ControllerProbe>) {
        let probe = Arc::new(ControllerProbe::default());
        let controller = Self {
            probe: Arc::clone(&probe),
            reset_delay,
            fail_reset,
        };
        (controller, probe)
    }
}

#[async_trait]
impl InterfaceController for RecordingController {
    async fn reset(&self, interface: &str) -> Result<()> {
        self.probe.reset_calls.fetch_add(1, Ordering::SeqCst);
        self.probe
            .interfaces
            .lock()
            .unwrap()
            .push(interface.to_string());

        if self.probe.in_reset.swap(true, Ordering::SeqCst) {
            self.probe.overlap_detected.store(true, Ordering::SeqCst);
        }

        tokio::time::sleep(self.reset_delay).await;
        self.probe.in_reset.store(false, Ordering::SeqCst);

        match self.fail_reset {
            Some(message) => Err(Error::interface_control(message)),
            None => Ok(()),
        }
    }

    async fn is_up(&self, _interface: &str) -> Result<bool> {
        self.probe.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    fn controller_name(&self) -> &'static str {
        "recording"
    }
}

/// One scripted resolver answer
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Resolve to this address
    Ip(IpAddr),
    /// Fail with a terminal error
    Fail(&'static str),
}

/// An IpResolver that replays a fixed script of answers
pub struct ScriptedResolver {
    steps: Mutex<VecDeque<Step>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedResolver {
    /// Create a resolver and a handle to its call counter
    pub fn new(steps: Vec<Step>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = Self {
            steps: Mutex::new(steps.into()),
            calls: Arc::clone(&calls),
        };
        (resolver, calls)
    }
}

#[async_trait]
impl IpResolver for ScriptedResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Ip(ip)) => Ok(ip),
            Some(Step::Fail(message)) => Err(Error::http(message)),
            None => Err(Error::Other("resolver script exhausted".to_string())),
        }
    }

    fn resolver_name(&self) -> &'static str {
        "scripted"
    }
}

/// Shorthand for an IPv4 address
pub fn ip(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
    IpAddr::from([a, b, c, d])
}

/// Helper to create a ServiceConfig with no real waiting
pub fn fast_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.interface = "pppoe".to_string();
    config.reconnect.settle_delay_ms = 0;
    config.reconnect.up_poll_interval_ms = 1;
    config.reconnect.max_up_polls = 3;
    config.reconnect.event_channel_capacity = 100;
    config
}
