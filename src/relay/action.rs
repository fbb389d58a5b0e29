//! Hardware action execution via control scripts

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use crate::{Error, Result};

/// Runs a named, parameterless hardware action
#[async_trait]
pub trait ActionRunner: Send + Sync {
    /// Run the action to completion
    ///
    /// # Errors
    ///
    /// Returns `Error::HardwareInvocation` if the action could not be run or failed
    async fn run(&self, action: &str) -> Result<()>;
}

/// Runs `<scripts_dir>/<action>` as a subprocess
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    scripts_dir: PathBuf,
    timeout: Option<Duration>,
}

impl ScriptRunner {
    #[must_use]
    pub fn new(scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
            timeout: None,
        }
    }

    /// Kill scripts that run longer than `limit`
    #[must_use]
    pub const fn with_timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    #[must_use]
    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    fn script_path(&self, action: &str) -> PathBuf {
        self.scripts_dir.join(action)
    }
}

#[async_trait]
impl ActionRunner for ScriptRunner {
    async fn run(&self, action: &str) -> Result<()> {
        let failed = |reason: String| Error::HardwareInvocation {
            action: action.to_string(),
            reason,
        };

        let script = self.script_path(action);
        tracing::debug!(action, script = %script.display(), "running control script");

        let child = Command::new(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| failed(format!("failed to spawn {}: {e}", script.display())))?;

        let output = match self.timeout {
            Some(limit) => timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| failed(format!("timed out after {limit:?}")))?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| failed(format!("wait failed: {e}")))?;

        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(action, stderr = %stderr, "control script stderr");
        }

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            return Err(failed(format!("exited with code {code}")));
        }

        tracing::info!(action, "control script completed");
        Ok(())
    }
}
