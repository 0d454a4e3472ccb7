//! File notifier: appends outcome reports to a local file
//! (`file://` locators).
//!
//! The locator path is a template; placeholders are expanded per
//! delivery so one agent can write per-deployment or per-day report
//! files:
//!
//! - `{s}` software identifier
//! - `{i}` deployment id
//! - `{h}` hostname
//! - `{t}` timestamp `%Y-%m-%dT%H-%M-%S`
//! - `{d}` date `%Y-%m-%d`

use std::fs::OpenOptions;
use std::io::Write;

use async_trait::async_trait;
use chrono::{Local, SecondsFormat};
use url::Url;

use crate::error::NotifyError;
use crate::notify::{Notifier, NotifierFactory, NotifyResult, OutcomeReport};

/// Factory for [`FileNotifier`], accepting `file://` locators.
pub struct FileNotifierFactory;

#[async_trait]
impl NotifierFactory for FileNotifierFactory {
    async fn open(&self, locator: &str) -> NotifyResult<Box<dyn Notifier>> {
        let url =
            Url::parse(locator).map_err(|err| NotifyError::InvalidLocator(err.to_string()))?;
        if url.scheme() != "file" {
            return Err(NotifyError::NotApplicable);
        }

        Ok(Box::new(FileNotifier {
            template: url.path().to_string(),
        }))
    }
}

/// Appends one header line plus the captured log per delivery.
pub struct FileNotifier {
    template: String,
}

impl FileNotifier {
    /// Notifier writing to the given path template. Mainly for tests;
    /// the daemon goes through [`FileNotifierFactory`].
    pub fn new(template: String) -> Self {
        Self { template }
    }

    fn expand(&self, report: &OutcomeReport) -> String {
        let now = Local::now();
        self.template
            .replace("{s}", &report.identifier)
            .replace("{i}", &report.deployment_id)
            .replace("{h}", &report.hostname)
            .replace("{t}", &now.format("%Y-%m-%dT%H-%M-%S").to_string())
            .replace("{d}", &now.format("%Y-%m-%d").to_string())
    }
}

#[async_trait]
impl Notifier for FileNotifier {
    async fn deliver(&self, report: &OutcomeReport) -> NotifyResult<()> {
        let path = self.expand(report);

        let mut options = OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }
        let mut file = options.open(&path)?;

        let verb = if report.success {
            "successfully"
        } else {
            "with failure"
        };
        writeln!(
            file,
            "[{}] Deployment {:?} finished {verb}:",
            Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            report.deployment_id
        )?;
        writeln!(file, "{}", report.content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn report(success: bool) -> OutcomeReport {
        OutcomeReport {
            success,
            deployment_id: "2024-06-01".to_string(),
            content: "INFO[t] line one\nERRO[t] line two".to_string(),
            hostname: "web-1".to_string(),
            identifier: "myapp".to_string(),
            agent_version: "0.2.0".to_string(),
        }
    }

    #[tokio::test]
    async fn test_appends_header_and_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.log");
        let notifier = FileNotifier::new(path.display().to_string());

        notifier.deliver(&report(true)).await.unwrap();
        notifier.deliver(&report(false)).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Deployment \"2024-06-01\" finished successfully:"));
        assert!(written.contains("Deployment \"2024-06-01\" finished with failure:"));
        assert!(written.contains("INFO[t] line one"));
        // Two deliveries appended, not truncated.
        assert_eq!(written.matches("line two").count(), 2);
    }

    #[tokio::test]
    async fn test_placeholder_expansion() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("{s}-{i}-{h}.log");
        let notifier = FileNotifier::new(template.display().to_string());

        notifier.deliver(&report(true)).await.unwrap();

        assert!(dir.path().join("myapp-2024-06-01-web-1.log").exists());
    }

    #[tokio::test]
    async fn test_factory_scheme_handling() {
        let factory = FileNotifierFactory;
        assert!(factory.open("file:///var/log/deploys.log").await.is_ok());
        assert!(matches!(
            factory.open("slack+https://hooks.slack.com/x").await,
            Err(NotifyError::NotApplicable)
        ));
    }
}
