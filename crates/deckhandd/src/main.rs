//! Deckhand - Host Deployment Agent
//!
//! Polls an artifact store for the newest release bundle of a named
//! piece of software and applies each newly discovered bundle to the
//! local host following its appspec manifest, reporting the outcome
//! through the configured notification channels.

mod agent;
mod cli;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use deckhand_notify::NotifierRegistry;
use deckhand_store::{StoreError, StoreRegistry};

use crate::agent::Agent;
use crate::cli::AgentArgs;

#[tokio::main]
async fn main() -> Result<()> {
    let args = AgentArgs::parse();

    let filter = EnvFilter::try_new(&args.log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let store = match StoreRegistry::with_defaults().open(&args.storage).await {
        Ok(store) => store,
        Err(StoreError::NotApplicable) => {
            bail!("no storage backend accepts {:?}", args.storage)
        }
        Err(err) => return Err(err).context("unable to open storage"),
    };
    debug!(provider = %store.describe(), "Storage initialized");

    let notifiers = NotifierRegistry::with_defaults()
        .init(&args.reporter)
        .await
        .context("unable to create reporters")?;

    Agent::new(store, notifiers, args.identifier)
        .run(Duration::from_secs(args.fetch_interval))
        .await;

    Ok(())
}
