//! In-memory fakes for the notifier traits (testing only).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::notify::{Notifier, NotifyResult, OutcomeReport};

/// Records every delivered report.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    delivered: Arc<Mutex<Vec<OutcomeReport>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the delivered reports in delivery order.
    pub fn delivered(&self) -> Vec<OutcomeReport> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn deliver(&self, report: &OutcomeReport) -> NotifyResult<()> {
        self.delivered.lock().unwrap().push(report.clone());
        Ok(())
    }
}

/// Always fails delivery, for abort-semantics tests.
#[derive(Debug, Clone, Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn deliver(&self, _report: &OutcomeReport) -> NotifyResult<()> {
        Err(NotifyError::Delivery("sink unavailable".to_string()))
    }
}
