//! Reconnect orchestrator
//!
//! The ReconnectOrchestrator is responsible for:
//! - Resetting the managed interface via InterfaceController
//! - Waiting for the interface to report up again
//! - Resolving the public IP via IpResolver
//! - Comparing it against LastKnownIp and repeating the reset until it differs
//!
//! ## Architecture
//!
//! ```text
//!   POST /reconnect
//!         │
//!         ▼
//! ┌──────────────────────┐
//! │ ReconnectOrchestrator│── holds cycle lock ──► LastKnownIp
//! └──────────────────────┘
//!         │                           │
//!         ▼                           ▼
//! ┌─────────────────────┐   ┌──────────────┐   ┌─────────────┐
//! │ InterfaceController │   │  IpResolver  │   │   Events    │
//! │ (reset, is_up)      │   │  (resolve)   │   │  (notify)   │
//! └─────────────────────┘   └──────────────┘   └─────────────┘
//! ```
//!
//! ## Cycle States
//!
//! `Idle → Resetting → WaitingForIpChange → Succeeded | Failed`
//!
//! An unchanged IP in `WaitingForIpChange` sends the cycle back to
//! `Resetting`: the whole down/up sequence is repeated, not just the lookup.

use crate::config::{Admission, ServiceConfig};
use crate::error::{Error, Result};
use crate::state::LastKnownIp;
use crate::traits::{InterfaceController, IpResolver};
use crate::types::ReconnectResult;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, warn};

/// States of a single reconnect cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// No cycle running
    Idle,
    /// Interface is being cycled down and up
    Resetting,
    /// Interface is up, waiting to observe a new public IP
    WaitingForIpChange,
    /// New public IP confirmed
    Succeeded,
    /// Cycle aborted by an error
    Failed,
}

/// Events emitted by the ReconnectOrchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleEvent {
    /// Cycle moved to a new state
    StateChanged {
        state: CycleState,
        /// 1-based reset cycle within the current request
        cycle: u32,
    },

    /// Interface came back but the public IP did not change
    IpUnchanged {
        ip: IpAddr,
        cycle: u32,
    },

    /// Cycle confirmed a new public IP
    Succeeded {
        old_ip: IpAddr,
        new_ip: IpAddr,
        duration: Duration,
    },

    /// Cycle failed
    Failed {
        error: String,
    },

    /// Request refused because another cycle was running
    Rejected,
}

/// Core reconnect orchestrator
///
/// The orchestrator turns one reconnect request into a sequence of interface
/// resets and IP lookups, finishing once the public IP differs from
/// [`LastKnownIp`].
///
/// ## Lifecycle
///
/// 1. Create with [`ReconnectOrchestrator::start()`] (performs the initial
///    resolution) or [`ReconnectOrchestrator::with_initial_ip()`]
/// 2. Call [`ReconnectOrchestrator::reconnect()`] per request
///
/// ## Threading
///
/// The orchestrator is `Send + Sync` and is meant to be shared behind an
/// `Arc`. A tokio mutex around [`LastKnownIp`] is held for the whole cycle,
/// so at most one cycle touches the interface at a time and the address is
/// only read and written inside that critical section.
pub struct ReconnectOrchestrator {
    /// Interface to reset
    interface: String,

    /// Interface controller
    controller: Box<dyn InterfaceController>,

    /// Public IP resolver
    resolver: Box<dyn IpResolver>,

    /// Cycle lock and the state it guards
    last_known: Mutex<LastKnownIp>,

    /// Pause after the interface comes up
    settle_delay: Duration,

    /// Interval between interface status checks
    up_poll_interval: Duration,

    /// Status checks before giving up on the interface
    max_up_polls: u32,

    /// Reset cycles per request (None = unbounded)
    max_cycles: Option<u32>,

    /// Handling of overlapping requests
    admission: Admission,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<CycleEvent>,
}

impl ReconnectOrchestrator {
    /// Create an orchestrator, resolving the initial public IP first
    ///
    /// # Parameters
    ///
    /// - `controller`: Interface controller implementation
    /// - `resolver`: IP resolver implementation
    /// - `config`: Service configuration
    ///
    /// # Returns
    ///
    /// A tuple of (orchestrator, event_receiver) where event_receiver yields
    /// cycle events. Fails if the configuration is invalid or the initial
    /// resolution fails.
    pub async fn start(
        controller: Box<dyn InterfaceController>,
        resolver: Box<dyn IpResolver>,
        config: &ServiceConfig,
    ) -> Result<(Self, mpsc::Receiver<CycleEvent>)> {
        config.validate()?;

        info!("Resolving initial public IP via {}", resolver.resolver_name());
        let initial_ip = resolver.resolve().await?;
        info!("Initial public IP: {}", initial_ip);

        Self::with_initial_ip(controller, resolver, config, initial_ip)
    }

    /// Create an orchestrator with an already known public IP
    pub fn with_initial_ip(
        controller: Box<dyn InterfaceController>,
        resolver: Box<dyn IpResolver>,
        config: &ServiceConfig,
        initial_ip: IpAddr,
    ) -> Result<(Self, mpsc::Receiver<CycleEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.reconnect.event_channel_capacity);

        let orchestrator = Self {
            interface: config.interface.clone(),
            controller,
            resolver,
            last_known: Mutex::new(LastKnownIp::new(initial_ip)),
            settle_delay: config.reconnect.settle_delay(),
            up_poll_interval: config.reconnect.up_poll_interval(),
            max_up_polls: config.reconnect.max_up_polls,
            max_cycles: config.reconnect.max_cycles,
            admission: config.reconnect.admission,
            event_tx: tx,
        };

        Ok((orchestrator, rx))
    }

    /// Name of the managed interface
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Snapshot of the last confirmed public IP
    ///
    /// Waits for a running cycle to finish. The read takes the cycle lock, so
    /// with [`Admission::Reject`] a `reconnect()` arriving during the read is
    /// answered with [`Error::Busy`].
    pub async fn last_known_ip(&self) -> LastKnownIp {
        self.last_known.lock().await.clone()
    }

    /// Run one reconnect cycle
    ///
    /// Resets the interface until the public IP differs from the last
    /// confirmed one. On success the new address becomes the last known IP;
    /// on failure the last known IP is left untouched.
    ///
    /// # Returns
    ///
    /// - `Ok(ReconnectResult)`: Old/new address pair and elapsed time
    /// - `Err(Error::Busy)`: Another cycle is running and admission is `Reject`
    /// - `Err(Error)`: Any controller or resolver failure
    pub async fn reconnect(&self) -> Result<ReconnectResult> {
        let mut last_known = match self.admission {
            Admission::Queue => self.last_known.lock().await,
            Admission::Reject => match self.last_known.try_lock() {
                Ok(guard) => guard,
                Err(_) => {
                    warn!("Reconnect rejected: a cycle is already in progress");
                    self.emit_event(CycleEvent::Rejected);
                    return Err(Error::Busy);
                }
            },
        };

        info!("Starting the reconnection process for {}", self.interface);
        let started = Instant::now();

        let mut cycle = 0u32;
        let outcome = match self.run_cycle(&mut last_known, &mut cycle, started).await {
            Ok(result) => {
                info!(
                    "Success. Old IP: {}, New IP: {}, duration: {:?}",
                    result.old_ip, result.new_ip, result.duration
                );
                self.emit_event(CycleEvent::Succeeded {
                    old_ip: result.old_ip,
                    new_ip: result.new_ip,
                    duration: result.duration,
                });
                Ok(result)
            }
            Err(e) => {
                error!("Reconnect cycle failed: {}", e);
                self.transition(CycleState::Failed, cycle);
                self.emit_event(CycleEvent::Failed {
                    error: e.to_string(),
                });
                Err(e)
            }
        };

        drop(last_known);
        self.transition(CycleState::Idle, cycle);
        outcome
    }

    /// Reset-and-check loop, run with the cycle lock held
    ///
    /// `cycle` holds the number of the reset cycle reached, also on error.
    async fn run_cycle(
        &self,
        last_known: &mut LastKnownIp,
        cycle: &mut u32,
        started: Instant,
    ) -> Result<ReconnectResult> {
        loop {
            *cycle += 1;
            let cycle = *cycle;
            self.transition(CycleState::Resetting, cycle);
            self.reset_and_wait_up().await?;

            tokio::time::sleep(self.settle_delay).await;

            self.transition(CycleState::WaitingForIpChange, cycle);
            let new_ip = self.resolver.resolve().await?;

            if last_known.has_changed(new_ip) {
                let duration = started.elapsed();
                let old_ip = last_known.replace(new_ip);
                self.transition(CycleState::Succeeded, cycle);
                return Ok(ReconnectResult::new(old_ip, new_ip, duration));
            }

            info!(
                "IP address has not changed. Old IP: {}, New IP: {}",
                last_known.ip, new_ip
            );
            self.emit_event(CycleEvent::IpUnchanged { ip: new_ip, cycle });

            if let Some(max_cycles) = self.max_cycles
                && cycle >= max_cycles
            {
                return Err(Error::AddressUnchanged { cycles: cycle });
            }
        }
    }

    /// Reset the interface and poll until it reports up
    async fn reset_and_wait_up(&self) -> Result<()> {
        info!(
            "Attempting to reconnect interface {} via {}",
            self.interface,
            self.controller.controller_name()
        );
        self.controller.reset(&self.interface).await?;

        for poll in 1..=self.max_up_polls {
            if self.controller.is_up(&self.interface).await? {
                info!("Interface {} successfully brought up", self.interface);
                return Ok(());
            }

            debug!(
                "Waiting for interface {} to come up ({}/{})",
                self.interface, poll, self.max_up_polls
            );
            if poll < self.max_up_polls {
                tokio::time::sleep(self.up_poll_interval).await;
            }
        }

        Err(Error::InterfaceNeverUp {
            interface: self.interface.clone(),
            polls: self.max_up_polls,
        })
    }

    fn transition(&self, state: CycleState, cycle: u32) {
        debug!("Cycle {} -> {:?}", cycle, state);
        self.emit_event(CycleEvent::StateChanged { state, cycle });
    }

    /// Emit a cycle event
    fn emit_event(&self, event: CycleEvent) {
        // Never block the cycle on a slow consumer
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => warn!("Event channel full, dropping cycle event"),
            Err(TrySendError::Closed(_)) => {
                debug!("Event receiver dropped, discarding cycle event")
            }
        }
    }
}
