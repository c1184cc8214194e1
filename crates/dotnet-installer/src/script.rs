//! Script-based local installer: fetches and caches `dotnet-install.sh`/
//! `.ps1`, then invokes it with a pinned version and install directory.
//! Grounded on the teacher's atomic-write-then-rename cache convention
//! (`dotnet_index::storage`), reused here for the install-script cache file
//! named in spec.md §4.7's file layout.

use crate::{InstallContext, Installer};
use async_trait::async_trait;
use dotnet_index::Transport;
use dotnet_types::{AcquireError, InstallType, Mode, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

#[cfg(unix)]
const SCRIPT_EXT: &str = "sh";
#[cfg(windows)]
const SCRIPT_EXT: &str = "ps1";

const SCRIPT_URL_SH: &str = "https://dot.net/v1/dotnet-install.sh";
const SCRIPT_URL_PS1: &str = "https://dot.net/v1/dotnet-install.ps1";

pub struct ScriptInstaller {
    transport: Arc<dyn Transport>,
    /// `<storage>/install-scripts/`.
    script_cache_dir: PathBuf,
}

impl ScriptInstaller {
    pub fn new(transport: Arc<dyn Transport>, script_cache_dir: PathBuf) -> Self {
        Self { transport, script_cache_dir }
    }

    fn script_path(&self) -> PathBuf {
        self.script_cache_dir.join(format!("dotnet-install.{SCRIPT_EXT}"))
    }

    async fn ensure_script_cached(&self) -> Result<PathBuf> {
        let path = self.script_path();
        if path.exists() {
            return Ok(path);
        }

        let url = if SCRIPT_EXT == "sh" { SCRIPT_URL_SH } else { SCRIPT_URL_PS1 };
        let body = self.transport.fetch_text(url).await.map_err(AcquireError::Http)?;
        dotnet_index::storage::atomic_write_bytes(&path, body.as_bytes())?;
        set_executable(&path)?;
        Ok(path)
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

fn mode_flag(mode: Mode) -> &'static str {
    match mode {
        Mode::Sdk => "sdk",
        Mode::Runtime => "dotnet",
        Mode::AspNetCore => "aspnetcore",
    }
}

#[async_trait]
impl Installer for ScriptInstaller {
    async fn install(&self, ctx: &InstallContext) -> Result<PathBuf> {
        debug_assert_eq!(ctx.install_type, InstallType::Local);
        let script = self.ensure_script_cached().await?;

        std::fs::create_dir_all(&ctx.install_dir)?;

        #[cfg(unix)]
        let mut command = tokio::process::Command::new(&script);
        #[cfg(windows)]
        let mut command = {
            let mut c = tokio::process::Command::new("powershell");
            c.arg("-File").arg(&script);
            c
        };

        command
            .arg("--version")
            .arg(ctx.version.to_string())
            .arg("--install-dir")
            .arg(&ctx.install_dir)
            .arg("--architecture")
            .arg(ctx.architecture.to_string());
        if ctx.mode != Mode::Sdk {
            command.args(["--runtime", mode_flag(ctx.mode)]);
        }

        let child = command
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()?;

        let output = match tokio::time::timeout(ctx.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(version = %ctx.version, timeout_seconds = ctx.timeout.as_secs(), "install script timed out");
                return Err(AcquireError::InstallTimeout { timeout_seconds: ctx.timeout.as_secs() });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            if stderr.trim().is_empty() {
                return Err(AcquireError::InstallExitNonZero { code: output.status.code().unwrap_or(-1) });
            }
            return Err(AcquireError::InstallScriptError { stderr });
        }

        let host = crate::host_path_in(&ctx.install_dir);
        if !host.exists() {
            return Err(AcquireError::InstallationValidationFailed { path: host.display().to_string() });
        }
        Ok(host)
    }

    async fn uninstall(&self, ctx: &InstallContext) -> Result<()> {
        debug_assert_eq!(ctx.install_type, InstallType::Local);
        if ctx.install_dir.exists() {
            std::fs::remove_dir_all(&ctx.install_dir)?;
        }
        Ok(())
    }
}
