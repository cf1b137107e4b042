//! Trigger side of the IP changer
//!
//! Posts `/reconnect` to the daemon, reads the outcome and reports it
//! through a [`Notifier`]. The daemon does all the work; a trigger only
//! waits, so the request carries no timeout of its own.
//!
//! Desktop notifications go through `notify-send`, which needs a freedesktop
//! notification daemon (Linux and BSD desktops). Other platforms can plug in
//! their own [`Notifier`]; without one, delivery fails and is only logged.

use async_trait::async_trait;
use ipchanger_core::ReconnectResult;
use tokio::process::Command;
use tracing::{error, info, warn};

/// Notification title used for every message
pub const NOTIFICATION_TITLE: &str = "IP Changer";

/// Daemon address used when none is configured
pub const DEFAULT_SERVER: &str = "http://192.168.1.1:4782";

/// Errors returned by the trigger client
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    /// The daemon could not be reached or the response could not be read
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The daemon answered with a non-success status
    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// The daemon answered 200 with a body that is not a reconnect result
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP client for the daemon's reconnect endpoint
#[derive(Debug, Clone)]
pub struct TriggerClient {
    url: String,
    client: reqwest::Client,
}

impl TriggerClient {
    /// Create a client for the daemon at `server` (scheme, host and port)
    pub fn new(server: &str) -> Self {
        Self {
            url: format!("{}/reconnect", server.trim_end_matches('/')),
            client: reqwest::Client::new(),
        }
    }

    /// Full URL of the reconnect endpoint
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Ask the daemon for a new address and wait for the cycle to finish
    pub async fn reconnect(&self) -> Result<ReconnectResult, TriggerError> {
        let request_error = |source| TriggerError::Request {
            url: self.url.clone(),
            source,
        };

        let response = self
            .client
            .post(&self.url)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        let body = response.text().await.map_err(request_error)?;

        if !status.is_success() {
            return Err(TriggerError::Server {
                status: status.as_u16(),
                message: body.trim().to_string(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Text shown after a successful reconnect
pub fn success_message(result: &ReconnectResult) -> String {
    format!(
        "Successfully! Old IP: {}, New IP: {}",
        result.old_ip, result.new_ip
    )
}

/// Desktop notification sink
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Show a notification
    async fn notify(&self, title: &str, message: &str) -> anyhow::Result<()>;
}

/// Notifier backed by the freedesktop `notify-send` command
#[derive(Debug, Clone)]
pub struct NotifySend {
    program: String,
}

impl NotifySend {
    /// Use `notify-send` from `PATH`
    pub fn new() -> Self {
        Self::with_program("notify-send")
    }

    /// Use another program with the same `<title> <message>` calling convention
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for NotifySend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for NotifySend {
    async fn notify(&self, title: &str, message: &str) -> anyhow::Result<()> {
        let output = Command::new(&self.program)
            .arg(title)
            .arg(message)
            .output()
            .await
            .map_err(|e| anyhow::anyhow!("could not run {}: {}", self.program, e))?;

        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

/// Run one reconnect and report the outcome
///
/// Notification failures are logged and otherwise ignored.
pub async fn trigger_reconnect(
    client: &TriggerClient,
    notifier: &dyn Notifier,
) -> Result<ReconnectResult, TriggerError> {
    info!("Requesting reconnect from {}", client.url());

    match client.reconnect().await {
        Ok(result) => {
            info!(
                "Reconnect completed successfully: {} -> {} in {:?}",
                result.old_ip, result.new_ip, result.duration
            );
            send_notification(notifier, &success_message(&result)).await;
            Ok(result)
        }
        Err(e) => {
            error!("Reconnect error: {}", e);
            send_notification(notifier, "Reconnect error").await;
            Err(e)
        }
    }
}

async fn send_notification(notifier: &dyn Notifier, message: &str) {
    if let Err(e) = notifier.notify(NOTIFICATION_TITLE, message).await {
        warn!("Failed to send notification: {}", e);
    }
}
