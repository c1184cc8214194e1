//! Platform-installer-based global installer: invokes the OS-native package
//! installer (`msiexec` on Windows, `installer`/`pkgutil` on macOS) rather
//! than the tool-owned script, per spec.md §9's "two concrete
//! implementations selected by installType". Acquiring the installer package
//! itself is out of scope (spec.md's Non-goals exclude "writing new
//! installers"); this assumes a package path has already been resolved.

use crate::{InstallContext, Installer};
use async_trait::async_trait;
use dotnet_types::{AcquireError, InstallType, Result};
use std::path::PathBuf;
use tracing::warn;

pub struct PlatformInstaller {
    /// Path to the OS-native installer package (`.msi`, `.pkg`) to invoke.
    package_path: PathBuf,
}

impl PlatformInstaller {
    pub fn new(package_path: PathBuf) -> Self {
        Self { package_path }
    }

    #[cfg(windows)]
    fn install_command(&self, ctx: &InstallContext) -> tokio::process::Command {
        let mut command = tokio::process::Command::new("msiexec");
        command.args(["/i", &self.package_path.to_string_lossy(), "/quiet", "/norestart"]);
        command.arg(format!("INSTALLDIR={}", ctx.install_dir.display()));
        command
    }

    #[cfg(target_os = "macos")]
    fn install_command(&self, _ctx: &InstallContext) -> tokio::process::Command {
        let mut command = tokio::process::Command::new("installer");
        command.args(["-pkg", &self.package_path.to_string_lossy(), "-target", "/"]);
        command
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn install_command(&self, ctx: &InstallContext) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.package_path);
        command.arg("--install-dir").arg(&ctx.install_dir).arg("--quiet");
        command
    }
}

#[async_trait]
impl Installer for PlatformInstaller {
    async fn install(&self, ctx: &InstallContext) -> Result<PathBuf> {
        debug_assert_eq!(ctx.install_type, InstallType::Global);
        std::fs::create_dir_all(&ctx.install_dir)?;

        let child = self
            .install_command(ctx)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()?;

        let output = match tokio::time::timeout(ctx.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(version = %ctx.version, "platform installer timed out");
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
        debug_assert_eq!(ctx.install_type, InstallType::Global);
        if ctx.install_dir.exists() {
            std::fs::remove_dir_all(&ctx.install_dir)?;
        }
        Ok(())
    }
}
