// # ipchanger - reconnect trigger
//
// Asks the ipchangerd daemon for a new public address and reports the result
// as a desktop notification. Progress is appended to a log file rather than
// printed, so the command can be bound to a desktop shortcut.
//
// ## Example
//
// ```bash
// ipchanger reconnect
// ipchanger reconnect --server http://10.0.0.1:4782
// IPCHANGER_LOG_FILE=/tmp/ipchanger.log ipchanger reconnect
// ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ipchanger_trigger::{DEFAULT_SERVER, NotifySend, TriggerClient, trigger_reconnect};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

#[derive(Parser)]
#[command(name = "ipchanger", version, about = "Trigger a reconnect on the IP changer daemon")]
struct Cli {
    /// File that receives the log lines (appended, created if missing)
    #[arg(long, global = true, env = "IPCHANGER_LOG_FILE", default_value = "app.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reset the uplink and wait for a new public address
    Reconnect {
        /// Daemon base URL
        #[arg(long, env = "IPCHANGER_SERVER", default_value = DEFAULT_SERVER)]
        server: String,
    },
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_file) {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }

    match cli.command {
        Commands::Reconnect { server } => {
            let client = TriggerClient::new(&server);
            match trigger_reconnect(&client, &NotifySend::new()).await {
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Reconnect error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
