//! Slack webhook notifier (`slack+https://` locators).
//!
//! The locator is the webhook URL with a `slack+` scheme prefix so the
//! registry can tell it apart from plain HTTP sinks.

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::error::NotifyError;
use crate::notify::{Notifier, NotifierFactory, NotifyResult, OutcomeReport};

const COLOR_SUCCESS: &str = "#3c763d";
const COLOR_FAILURE: &str = "#a94442";

/// Factory for [`SlackNotifier`], accepting `slack+https://` locators.
pub struct SlackNotifierFactory;

#[async_trait]
impl NotifierFactory for SlackNotifierFactory {
    async fn open(&self, locator: &str) -> NotifyResult<Box<dyn Notifier>> {
        let url =
            Url::parse(locator).map_err(|err| NotifyError::InvalidLocator(err.to_string()))?;
        if url.scheme() != "slack+https" {
            return Err(NotifyError::NotApplicable);
        }

        let webhook = locator
            .strip_prefix("slack+")
            .unwrap_or(locator)
            .to_string();

        Ok(Box::new(SlackNotifier {
            webhook,
            client: reqwest::Client::new(),
        }))
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct Field {
    title: String,
    value: String,
    short: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct Attachment {
    color: String,
    text: String,
    fields: Vec<Field>,
    footer: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct WebhookMessage {
    text: String,
    attachments: Vec<Attachment>,
}

impl WebhookMessage {
    fn from_report(report: &OutcomeReport) -> Self {
        let (verb, color) = if report.success {
            ("succeeded", COLOR_SUCCESS)
        } else {
            ("failed", COLOR_FAILURE)
        };

        Self {
            text: format!("Deployment {verb}"),
            attachments: vec![Attachment {
                color: color.to_string(),
                text: format!("```\n{}```", report.content),
                fields: vec![
                    Field {
                        title: "Host".to_string(),
                        value: report.hostname.clone(),
                        short: true,
                    },
                    Field {
                        title: "Deployment-ID".to_string(),
                        value: report.deployment_id.clone(),
                        short: true,
                    },
                    Field {
                        title: "Software Identifier".to_string(),
                        value: report.identifier.clone(),
                        short: true,
                    },
                ],
                footer: format!("deckhand {}", report.agent_version),
            }],
        }
    }
}

/// Posts one webhook message per delivery.
pub struct SlackNotifier {
    webhook: String,
    client: reqwest::Client,
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn deliver(&self, report: &OutcomeReport) -> NotifyResult<()> {
        let payload = WebhookMessage::from_report(report);

        let response = self
            .client
            .post(&self.webhook)
            .json(&payload)
            .send()
            .await
            .map_err(|err| NotifyError::Delivery(err.to_string()))?;

        response
            .error_for_status()
            .map_err(|err| NotifyError::Delivery(err.to_string()))?;

        Ok(())
    }
}
