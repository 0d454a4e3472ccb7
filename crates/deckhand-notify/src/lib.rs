//! Deckhand notification backends.
//!
//! Notifiers deliver the outcome of a completed deployment run. Unlike
//! the store selection, every configured locator is offered to every
//! registered factory and all acceptances are kept, so one run can be
//! reported to several sinks.

pub mod error;
pub mod fakes;
pub mod file;
pub mod notify;
pub mod slack;

pub use error::NotifyError;
pub use fakes::{FailingNotifier, MemoryNotifier};
pub use file::{FileNotifier, FileNotifierFactory};
pub use notify::{
    Notifier, NotifierFactory, NotifierRegistry, NotifierSet, NotifyResult, OutcomeReport,
};
pub use slack::{SlackNotifier, SlackNotifierFactory};
