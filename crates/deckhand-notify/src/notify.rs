//! Notification abstraction and backend selection.

use async_trait::async_trait;
use tracing::debug;

use crate::error::NotifyError;

/// Result type for notification operations.
pub type NotifyResult<T> = std::result::Result<T, NotifyError>;

/// Outcome of one completed deployment lifecycle run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeReport {
    /// Whether the lifecycle run succeeded.
    pub success: bool,

    /// Deployment id the run applied (or attempted to).
    pub deployment_id: String,

    /// Rendered captured log of the run.
    pub content: String,

    /// Local hostname, for display.
    pub hostname: String,

    /// Software identifier the agent watches, for display.
    pub identifier: String,

    /// Agent version string, for display.
    pub agent_version: String,
}

/// A sink for deployment outcome reports.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one report.
    async fn deliver(&self, report: &OutcomeReport) -> NotifyResult<()>;
}

/// Builds a notifier from a locator, or declines it.
#[async_trait]
pub trait NotifierFactory: Send + Sync {
    /// Offer a locator. `NotifyError::NotApplicable` when the scheme is
    /// not handled; any other error aborts startup.
    async fn open(&self, locator: &str) -> NotifyResult<Box<dyn Notifier>>;
}

/// Ordered list of notifier factories.
#[derive(Default)]
pub struct NotifierRegistry {
    factories: Vec<Box<dyn NotifierFactory>>,
}

impl NotifierRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in backends: file, then Slack webhook.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::file::FileNotifierFactory));
        registry.register(Box::new(crate::slack::SlackNotifierFactory));
        registry
    }

    /// Append a factory.
    pub fn register(&mut self, factory: Box<dyn NotifierFactory>) {
        self.factories.push(factory);
    }

    /// Offer every locator to every factory. All acceptances are kept;
    /// declines move on; any real error is fatal.
    pub async fn init(&self, locators: &[String]) -> NotifyResult<NotifierSet> {
        let mut accepted = Vec::new();

        for locator in locators {
            for factory in &self.factories {
                match factory.open(locator).await {
                    Ok(notifier) => accepted.push(notifier),
                    Err(NotifyError::NotApplicable) => continue,
                    Err(err) => return Err(err),
                }
            }
        }

        debug!(count = accepted.len(), "Notifiers initialized");
        Ok(NotifierSet { notifiers: accepted })
    }
}

/// The notifiers retained for the lifetime of the agent.
pub struct NotifierSet {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierSet {
    /// Set built from already-constructed notifiers.
    pub fn from_notifiers(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    /// Number of retained notifiers.
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Whether no notifier was retained.
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Deliver a report to every retained notifier in order. The first
    /// failure aborts the remaining deliveries and is surfaced; the
    /// deployment outcome itself is unaffected.
    pub async fn deliver_all(&self, report: &OutcomeReport) -> NotifyResult<()> {
        for notifier in &self.notifiers {
            notifier.deliver(report).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FailingNotifier, MemoryNotifier};

    fn report() -> OutcomeReport {
        OutcomeReport {
            success: true,
            deployment_id: "v42".to_string(),
            content: "INFO[t] done".to_string(),
            hostname: "web-1".to_string(),
            identifier: "myapp".to_string(),
            agent_version: "0.2.0".to_string(),
        }
    }

    struct AcceptAllFactory(MemoryNotifier);

    #[async_trait]
    impl NotifierFactory for AcceptAllFactory {
        async fn open(&self, _locator: &str) -> NotifyResult<Box<dyn Notifier>> {
            Ok(Box::new(self.0.clone()))
        }
    }

    struct DeclineFactory;

    #[async_trait]
    impl NotifierFactory for DeclineFactory {
        async fn open(&self, _locator: &str) -> NotifyResult<Box<dyn Notifier>> {
            Err(NotifyError::NotApplicable)
        }
    }

    struct BrokenFactory;

    #[async_trait]
    impl NotifierFactory for BrokenFactory {
        async fn open(&self, _locator: &str) -> NotifyResult<Box<dyn Notifier>> {
            Err(NotifyError::InvalidLocator("bad".to_string()))
        }
    }

    #[tokio::test]
    async fn test_every_locator_offered_to_every_factory() {
        let sink = MemoryNotifier::new();
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(DeclineFactory));
        registry.register(Box::new(AcceptAllFactory(sink.clone())));

        let locators = vec!["a://x".to_string(), "b://y".to_string()];
        let set = registry.init(&locators).await.unwrap();

        // One acceptance per locator.
        assert_eq!(set.len(), 2);
    }

    #[tokio::test]
    async fn test_real_init_error_is_fatal() {
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(BrokenFactory));

        let locators = vec!["a://x".to_string()];
        assert!(matches!(
            registry.init(&locators).await,
            Err(NotifyError::InvalidLocator(_))
        ));
    }

    #[tokio::test]
    async fn test_first_delivery_error_aborts_the_rest() {
        let late = MemoryNotifier::new();
        let set = NotifierSet::from_notifiers(vec![
            Box::new(FailingNotifier),
            Box::new(late.clone()),
        ]);

        assert!(set.deliver_all(&report()).await.is_err());
        assert!(late.delivered().is_empty());
    }

    #[tokio::test]
    async fn test_deliver_all_reaches_every_sink() {
        let first = MemoryNotifier::new();
        let second = MemoryNotifier::new();
        let set = NotifierSet::from_notifiers(vec![
            Box::new(first.clone()),
            Box::new(second.clone()),
        ]);

        set.deliver_all(&report()).await.unwrap();
        assert_eq!(first.delivered().len(), 1);
        assert_eq!(second.delivered().len(), 1);
        assert_eq!(first.delivered()[0].deployment_id, "v42");
    }
}
