//! Polling/dedup scheduler around the lifecycle engine.
//!
//! A capacity-1 trigger channel coalesces timer signals: a signal
//! arriving while one is already pending is dropped. One worker
//! consumes triggers strictly sequentially, so no two lifecycle runs
//! ever overlap and the last-applied id needs no locking.

use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use deckhand_core::{lifecycle, Bundle, Manifest, RunLog};
use deckhand_notify::{NotifierSet, OutcomeReport};
use deckhand_store::ArtifactStore;

/// Version string reported in notification footers.
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The deployment agent: one store, a set of notifiers, and the
/// in-memory record of the last successfully applied deployment.
pub struct Agent {
    store: Box<dyn ArtifactStore>,
    notifiers: NotifierSet,
    identifier: String,
    /// Never persisted; a restart forgets it and re-applies.
    last_deployed: Option<String>,
}

impl Agent {
    pub fn new(store: Box<dyn ArtifactStore>, notifiers: NotifierSet, identifier: String) -> Self {
        Self {
            store,
            notifiers,
            identifier,
            last_deployed: None,
        }
    }

    /// Run forever. The timer task only enqueues triggers; the worker
    /// applies them one at a time.
    pub async fn run(self, interval: Duration) {
        let (trigger_tx, trigger_rx) = mpsc::channel::<()>(1);

        // Check once at startup.
        let _ = trigger_tx.try_send(());

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the startup check
            // above already covers it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                // Drop the signal when a check is already pending.
                let _ = trigger_tx.try_send(());
            }
        });

        self.serve(trigger_rx).await;
    }

    /// Drain triggers strictly sequentially until the channel closes.
    async fn serve(mut self, mut trigger_rx: mpsc::Receiver<()>) {
        while trigger_rx.recv().await.is_some() {
            self.check().await;
        }
    }

    /// One deployment check: find the latest id, skip if already
    /// applied, otherwise run the full lifecycle and report the outcome.
    pub async fn check(&mut self) {
        debug!("Start fetching latest deployment");
        let deployment = match self.store.latest_deployment(&self.identifier).await {
            Ok(id) => id,
            Err(err) => {
                error!(error = %err, "Unable to get latest deployment ID");
                return;
            }
        };

        if self.last_deployed.as_deref() == Some(deployment.as_str()) {
            debug!(deployment_id = %deployment, "Latest deployment already deployed");
            return;
        }

        info!(deployment_id = %deployment, "Starting deployment");
        let log = RunLog::new();

        let success = match self.apply(&deployment, &log).await {
            Ok(()) => {
                // Only a fully successful run advances the marker; a
                // failure leaves it so the next trigger retries.
                self.last_deployed = Some(deployment.clone());
                log.info("Deployment succeeded");
                true
            }
            Err(err) => {
                log.error(&format!("Deployment failed: {err:#}"));
                false
            }
        };

        let report = OutcomeReport {
            success,
            deployment_id: deployment,
            content: log.render(),
            hostname: local_hostname(),
            identifier: self.identifier.clone(),
            agent_version: AGENT_VERSION.to_string(),
        };
        if let Err(err) = self.notifiers.deliver_all(&report).await {
            error!(error = %err, "Failed sending reports");
        }
    }

    async fn apply(&self, deployment_id: &str, log: &RunLog) -> anyhow::Result<()> {
        let raw = self
            .store
            .fetch_artifact(&self.identifier, deployment_id)
            .await
            .context("unable to fetch deployment bundle")?;

        let bundle = Bundle::from_bytes(raw).context("unable to read deployment bundle")?;
        let manifest = Manifest::parse(&bundle)?;

        lifecycle::execute(&bundle, &manifest, log).await?;
        Ok(())
    }
}

/// Local hostname for notification payloads.
fn local_hostname() -> String {
    #[cfg(unix)]
    if let Ok(name) = nix::unistd::gethostname() {
        return name.to_string_lossy().into_owned();
    }

    "localhost".to_string()
}
