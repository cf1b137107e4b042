// # ipchangerd - IP changer daemon
//
// The ipchangerd daemon is a thin integration layer. It is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the netifd controller and HTTP resolver into the orchestrator
// 4. Serving `POST /reconnect` until SIGINT/SIGTERM
//
// All reconnect logic lives in ipchanger-core.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Service
// - `IPCHANGER_INTERFACE`: Interface to reset (default: pppoe)
// - `IPCHANGER_LISTEN`: Listen address (default: 0.0.0.0:4782)
// - `IPCHANGER_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ### Resolver
// - `IPCHANGER_ENDPOINTS`: Comma-separated echo service URLs
// - `IPCHANGER_MAX_ATTEMPTS`: Lookups per resolution (default: 3)
// - `IPCHANGER_REQUEST_TIMEOUT_MS`: Per-lookup timeout (default: 3000)
// - `IPCHANGER_BACKOFF_MS`: Pause after a transport failure (default: 500)
//
// ### Reconnect
// - `IPCHANGER_SETTLE_DELAY_MS`: Pause before the IP check (default: 1000)
// - `IPCHANGER_UP_POLL_INTERVAL_MS`: Interface status poll interval (default: 1000)
// - `IPCHANGER_MAX_UP_POLLS`: Status checks before giving up (default: 60)
// - `IPCHANGER_MAX_CYCLES`: Reset cycles per request (default: unbounded)
// - `IPCHANGER_ADMISSION`: queue or reject overlapping requests (default: queue)
//
// ## Example
//
// ```bash
// export IPCHANGER_INTERFACE=wan
// export IPCHANGER_ADMISSION=reject
//
// ipchangerd
// ```

mod api;

use anyhow::{Context, Result};
use ipchanger_core::{Admission, CycleEvent, ReconnectOrchestrator, ServiceConfig};
use ipchanger_iface_netifd::NetifdController;
use ipchanger_ip_http::HttpIpResolver;
use std::env;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon configuration
#[derive(Debug)]
struct Config {
    service: ServiceConfig,
    log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut service = ServiceConfig::default();

        if let Some(interface) = lookup("IPCHANGER_INTERFACE") {
            service.interface = interface.trim().to_string();
        }
        if let Some(listen) = lookup("IPCHANGER_LISTEN") {
            service.listen_addr = listen.trim().to_string();
        }
        if let Some(endpoints) = lookup("IPCHANGER_ENDPOINTS") {
            service.resolver.endpoints = endpoints
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = parse_var(&lookup, "IPCHANGER_MAX_ATTEMPTS")? {
            service.resolver.max_attempts = v;
        }
        if let Some(v) = parse_var(&lookup, "IPCHANGER_REQUEST_TIMEOUT_MS")? {
            service.resolver.request_timeout_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "IPCHANGER_BACKOFF_MS")? {
            service.resolver.backoff_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "IPCHANGER_SETTLE_DELAY_MS")? {
            service.reconnect.settle_delay_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "IPCHANGER_UP_POLL_INTERVAL_MS")? {
            service.reconnect.up_poll_interval_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "IPCHANGER_MAX_UP_POLLS")? {
            service.reconnect.max_up_polls = v;
        }
        service.reconnect.max_cycles = parse_var(&lookup, "IPCHANGER_MAX_CYCLES")?;
        if let Some(v) = parse_var::<Admission>(&lookup, "IPCHANGER_ADMISSION")? {
            service.reconnect.admission = v;
        }

        let log_level = match lookup("IPCHANGER_LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            other => anyhow::bail!(
                "IPCHANGER_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        };

        Ok(Self { service, log_level })
    }

    /// Validate the configuration
    ///
    /// On top of the structural checks in ipchanger-core, keep timings in
    /// ranges that make sense for a router.
    fn validate(&self) -> Result<()> {
        self.service.validate()?;

        let resolver = &self.service.resolver;
        if resolver.max_attempts > 10 {
            anyhow::bail!(
                "IPCHANGER_MAX_ATTEMPTS must be between 1 and 10. Got: {}",
                resolver.max_attempts
            );
        }
        if !(100..=60_000).contains(&resolver.request_timeout_ms) {
            anyhow::bail!(
                "IPCHANGER_REQUEST_TIMEOUT_MS must be between 100 and 60000. Got: {}",
                resolver.request_timeout_ms
            );
        }
        if resolver.backoff_ms > 60_000 {
            anyhow::bail!(
                "IPCHANGER_BACKOFF_MS must be at most 60000. Got: {}",
                resolver.backoff_ms
            );
        }

        let reconnect = &self.service.reconnect;
        if !(100..=60_000).contains(&reconnect.up_poll_interval_ms) {
            anyhow::bail!(
                "IPCHANGER_UP_POLL_INTERVAL_MS must be between 100 and 60000. Got: {}",
                reconnect.up_poll_interval_ms
            );
        }
        if reconnect.settle_delay_ms > 60_000 {
            anyhow::bail!(
                "IPCHANGER_SETTLE_DELAY_MS must be at most 60000. Got: {}",
                reconnect.settle_delay_ms
            );
        }

        for url in &resolver.endpoints {
            if url.starts_with("http://") {
                warn!("Echo service {} uses HTTP (not HTTPS)", url);
            }
        }

        Ok(())
    }
}

/// Parse an optional environment variable, failing on malformed values
fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e)),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration validation error: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting ipchangerd for interface {}", config.service.interface);

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_daemon(config.service).await {
            Ok(()) => DaemonExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {:#}", e);
                DaemonExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run the daemon
async fn run_daemon(service: ServiceConfig) -> Result<()> {
    let resolver = HttpIpResolver::from_config(&service.resolver)?;
    info!("Echo service pool: {} endpoint(s)", resolver.endpoints().len());

    let controller = NetifdController::new();

    let (orchestrator, events) =
        ReconnectOrchestrator::start(Box::new(controller), Box::new(resolver), &service)
            .await
            .context("Failed to get initial IP address")?;
    let orchestrator = Arc::new(orchestrator);

    tokio::spawn(log_cycle_events(events));

    let listener = tokio::net::TcpListener::bind(&service.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", service.listen_addr))?;
    info!("Starting server on {}", service.listen_addr);

    axum::serve(listener, api::router(orchestrator))
        .with_graceful_shutdown(async {
            match wait_for_shutdown().await {
                Ok(signal) => info!("Received shutdown signal: {}", signal),
                Err(e) => error!("Shutdown signal error: {}", e),
            }
        })
        .await
        .context("HTTP server failed")?;

    info!("Shutting down daemon");
    Ok(())
}

/// Drain orchestrator events into the log
async fn log_cycle_events(events: tokio::sync::mpsc::Receiver<CycleEvent>) {
    let mut events = ReceiverStream::new(events);
    while let Some(event) = events.next().await {
        match event {
            CycleEvent::Succeeded {
                old_ip,
                new_ip,
                duration,
            } => info!("IP change {} -> {} took {:?}", old_ip, new_ip, duration),
            CycleEvent::Failed { error } => warn!("Reconnect cycle failed: {}", error),
            CycleEvent::Rejected => warn!("Overlapping reconnect request rejected"),
            other => tracing::debug!("Cycle event: {:?}", other),
        }
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
