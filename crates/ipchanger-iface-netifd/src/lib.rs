// # netifd Interface Controller
//
// This crate provides an interface controller for OpenWrt's netifd.
//
// ## Commands
//
// - `ifdown <name>`: disable the logical interface
// - `ifup <name>`: enable it again (for PPPoE this renegotiates the session)
// - `ifstatus <name>`: print the interface state as JSON, including an `up` boolean
//
// `ifdown`/`ifup` produce no structured output; success is signaled purely
// by the exit status.
//
// ## Concurrency
//
// The controller does not lock. Overlapping resets on the same interface
// race inside netifd, so callers serialize access (the reconnect
// orchestrator holds its cycle lock around every reset).

use async_trait::async_trait;
use ipchanger_core::{Error, InterfaceController, Result};
use serde::Deserialize;
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, info};

/// A command line; the interface name is appended as the final argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceCommand {
    program: String,
    args: Vec<String>,
}

impl InterfaceCommand {
    /// Run `program <interface>`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Run `program <args...> <interface>`
    pub fn with_args<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn build(&self, interface: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(interface).kill_on_drop(true);
        command
    }
}

/// Subset of `ifstatus` output we rely on
#[derive(Debug, Deserialize)]
struct InterfaceStatus {
    up: bool,
}

/// netifd-backed interface controller
#[derive(Debug, Clone)]
pub struct NetifdController {
    ifdown: InterfaceCommand,
    ifup: InterfaceCommand,
    ifstatus: InterfaceCommand,
}

impl NetifdController {
    /// Controller using the stock `ifdown`, `ifup` and `ifstatus` from `PATH`
    pub fn new() -> Self {
        Self {
            ifdown: InterfaceCommand::new("ifdown"),
            ifup: InterfaceCommand::new("ifup"),
            ifstatus: InterfaceCommand::new("ifstatus"),
        }
    }

    /// Controller using custom commands (wrappers, other paths)
    pub fn with_commands(
        ifdown: InterfaceCommand,
        ifup: InterfaceCommand,
        ifstatus: InterfaceCommand,
    ) -> Self {
        Self {
            ifdown,
            ifup,
            ifstatus,
        }
    }

    /// Run one command, failing on spawn error or non-zero exit
    async fn run(
        &self,
        command: &InterfaceCommand,
        action: &str,
        interface: &str,
    ) -> Result<Output> {
        debug!("Running {} {:?} {}", command.program, command.args, interface);

        let output = command.build(interface).output().await.map_err(|e| {
            Error::interface_control(format!(
                "failed to {} interface {}: could not run {}: {}",
                action, interface, command.program, e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::interface_control(format!(
                "failed to {} interface {}: {} exited with {}: {}",
                action, interface, command.program, output.status, stderr
            )));
        }

        Ok(output)
    }
}

impl Default for NetifdController {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the `up` flag from `ifstatus` output
pub fn parse_status(stdout: &str) -> Result<bool> {
    serde_json::from_str::<InterfaceStatus>(stdout)
        .map(|status| status.up)
        .map_err(|e| Error::interface_control(format!("unexpected interface status output: {}", e)))
}

#[async_trait]
impl InterfaceController for NetifdController {
    async fn reset(&self, interface: &str) -> Result<()> {
        info!("Interface reconnection: {}", interface);

        self.run(&self.ifdown, "disable", interface).await?;
        self.run(&self.ifup, "enable", interface).await?;

        Ok(())
    }

    async fn is_up(&self, interface: &str) -> Result<bool> {
        debug!("Checking interface status: {}", interface);

        let output = self.run(&self.ifstatus, "query", interface).await?;
        let up = parse_status(&String::from_utf8_lossy(&output.stdout))?;

        debug!("Interface status {}: up={}", interface, up);
        Ok(up)
    }

    fn controller_name(&self) -> &'static str {
        "netifd"
    }
}
