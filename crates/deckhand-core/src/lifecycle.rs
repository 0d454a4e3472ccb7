//! Deployment lifecycle state machine.
//!
//! ```text
//! [Start] => [DownloadBundle] => BeforeInstall => [Install] => AfterInstall
//!         => ApplicationStart => ValidateService => [End]
//! ```
//!
//! Bracketed steps are system-controlled; the named phases run user
//! hooks in manifest order. `ApplicationStop` is not supported; those
//! tasks belong in `BeforeInstall`. The first failure aborts the
//! remaining lifecycle with no rollback of work already done.

use crate::bundle::Bundle;
use crate::error::LifecycleError;
use crate::hooks::run_hook;
use crate::install::install_directive;
use crate::manifest::Manifest;
use crate::runlog::RunLog;

/// Phase run before the file-install checkpoint.
pub const BEFORE_INSTALL: &str = "BeforeInstall";

/// Phases run after the file-install checkpoint, in order.
pub const POST_INSTALL_PHASES: [&str; 3] = ["AfterInstall", "ApplicationStart", "ValidateService"];

/// Execute the full lifecycle for one bundle.
///
/// Validation runs first; a validation failure prevents all side
/// effects. Hooks declared under any other phase name never run.
pub async fn execute(
    bundle: &Bundle,
    manifest: &Manifest,
    log: &RunLog,
) -> Result<(), LifecycleError> {
    manifest.validate()?;

    run_phase(bundle, manifest, BEFORE_INSTALL, log).await?;

    for directive in &manifest.files {
        log.info(&format!(
            "Installing {:?} to {:?}",
            directive.source, directive.destination
        ));
        install_directive(bundle, directive)?;
    }

    for phase in POST_INSTALL_PHASES {
        run_phase(bundle, manifest, phase, log).await?;
    }

    Ok(())
}

async fn run_phase(
    bundle: &Bundle,
    manifest: &Manifest,
    phase: &'static str,
    log: &RunLog,
) -> Result<(), LifecycleError> {
    let Some(hooks) = manifest.hooks.get(phase) else {
        return Ok(());
    };

    for hook in hooks {
        log.info(&format!("Running {phase} hook {:?}", hook.location));
        run_hook(bundle, hook, log)
            .await
            .map_err(|source| LifecycleError::Hook { phase, source })?;
    }

    Ok(())
}
