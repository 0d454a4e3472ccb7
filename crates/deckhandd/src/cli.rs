//! Command-line configuration for the deployment agent.

use clap::Parser;

/// Deckhand deployment agent daemon.
#[derive(Debug, Parser)]
#[command(name = "deckhandd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Polls an artifact store and applies new release bundles", long_about = None)]
pub struct AgentArgs {
    /// Seconds between checks for new deployments
    #[arg(short = 'c', long, env = "DECKHAND_FETCH_INTERVAL", default_value_t = 60)]
    pub fetch_interval: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DECKHAND_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Reporting URI to notify about deployments (repeatable)
    #[arg(short, long = "reporter", env = "DECKHAND_REPORTER")]
    pub reporter: Vec<String>,

    /// Software identifier to query deployments for
    #[arg(short, long, env = "DECKHAND_IDENTIFIER", default_value = "default")]
    pub identifier: String,

    /// URI for the storage backend to use
    #[arg(short, long, env = "DECKHAND_STORAGE")]
    pub storage: String,
}
