//! Lifecycle hook execution.
//!
//! Hook scripts are streamed from the bundle straight into a shell's
//! stdin; they never touch the host filesystem. Each hook runs under a
//! deadline and, when `runas` is set, under the resolved user's
//! credentials (applied at spawn time).

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::bundle::Bundle;
use crate::error::HookError;
use crate::manifest::HookSpec;
use crate::runlog::RunLog;

/// Shell interpreter hook scripts are piped into.
pub const HOOK_SHELL: &str = "/bin/bash";

/// Run a single hook script to completion.
pub async fn run_hook(bundle: &Bundle, hook: &HookSpec, log: &RunLog) -> Result<(), HookError> {
    let entry = bundle
        .entry(&hook.location)
        .ok_or_else(|| HookError::ScriptNotFound(hook.location.clone()))?;

    let timeout = hook.effective_timeout();

    let mut command = Command::new(HOOK_SHELL);
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Credentials must resolve before anything is spawned.
    set_runas(&mut command, hook)?;

    let mut child = command.spawn().map_err(|source| HookError::Spawn {
        script: hook.location.clone(),
        source,
    })?;

    // Feed the script through stdin; closing the pipe lets the shell run.
    if let Some(mut stdin) = child.stdin.take() {
        let script = entry.data.clone();
        tokio::spawn(async move {
            let _ = stdin.write_all(&script).await;
            let _ = stdin.shutdown().await;
        });
    }

    let stdout_task = capture_lines(child.stdout.take(), log.clone(), "stdout");
    let stderr_task = capture_lines(child.stderr.take(), log.clone(), "stderr");

    let status = match tokio::time::timeout(Duration::from_secs(timeout), child.wait()).await {
        Ok(waited) => waited.map_err(|source| HookError::Spawn {
            script: hook.location.clone(),
            source,
        })?,
        Err(_) => {
            let _ = child.kill().await;
            let _ = tokio::join!(stdout_task, stderr_task);
            return Err(HookError::Timeout {
                script: hook.location.clone(),
                seconds: timeout,
            });
        }
    };

    // Drain whatever output is still buffered before judging the exit.
    let _ = tokio::join!(stdout_task, stderr_task);

    if !status.success() {
        return Err(HookError::Failed {
            script: hook.location.clone(),
            detail: status.to_string(),
        });
    }

    Ok(())
}

/// Route one child pipe line-by-line into the run log, tagged with the
/// stream name. stderr lines capture at error severity.
fn capture_lines(
    pipe: Option<impl AsyncRead + Unpin + Send + 'static>,
    log: RunLog,
    stream: &'static str,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let Some(pipe) = pipe else { return };
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if stream == "stderr" {
                log.error(&format!("[{stream}] {line}"));
            } else {
                log.info(&format!("[{stream}] {line}"));
            }
        }
    })
}

#[cfg(unix)]
fn set_runas(command: &mut Command, hook: &HookSpec) -> Result<(), HookError> {
    let Some(name) = hook.runas.as_deref() else {
        return Ok(());
    };

    let user = nix::unistd::User::from_name(name)
        .map_err(|err| HookError::RunAsResolution {
            user: name.to_string(),
            reason: err.to_string(),
        })?
        .ok_or_else(|| HookError::RunAsResolution {
            user: name.to_string(),
            reason: "no such user".to_string(),
        })?;

    command.uid(user.uid.as_raw()).gid(user.gid.as_raw());
    Ok(())
}

#[cfg(not(unix))]
fn set_runas(_command: &mut Command, _hook: &HookSpec) -> Result<(), HookError> {
    // No POSIX credential model here; scripts run as the agent user.
    Ok(())
}
