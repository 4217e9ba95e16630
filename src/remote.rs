// ABOUTME: Remote file transfer channel over scp
// ABOUTME: Wraps the OpenSSH client with captured stderr and keepalive options

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// An authenticated channel that copies local files to a remote host.
///
/// One logical channel is shared by all transfer workers; the number of
/// simultaneous copies in flight is bounded by the worker pool, not here.
#[async_trait]
pub trait RemoteFileChannel: Send + Sync {
    async fn copy(&self, local: &Path, remote: &Path) -> Result<()>;
}

/// scp-based implementation using a key-based identity.
#[derive(Debug, Clone)]
pub struct ScpChannel {
    user: String,
    host: String,
    identity_file: PathBuf,
}

impl ScpChannel {
    pub fn new(user: impl Into<String>, host: impl Into<String>, identity_file: PathBuf) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
            identity_file,
        }
    }
}

#[async_trait]
impl RemoteFileChannel for ScpChannel {
    async fn copy(&self, local: &Path, remote: &Path) -> Result<()> {
        let target = format!("{}@{}:{}", self.user, self.host, remote.display());
        tracing::debug!("scp {} -> {}", local.display(), target);

        let output = Command::new("scp")
            .arg("-B") // batch mode, never prompt for a password
            .arg("-q")
            .arg("-o")
            .arg("ServerAliveInterval=60") // keep the session alive during long copies
            .arg("-i")
            .arg(&self.identity_file)
            .arg(local)
            .arg(&target)
            .output()
            .await
            .context("Failed to execute scp. Is an OpenSSH client installed?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "scp {} -> {} failed: {}",
                local.display(),
                target,
                stderr.trim()
            );
        }

        Ok(())
    }
}
