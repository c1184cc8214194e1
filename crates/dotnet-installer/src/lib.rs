//! Install Invoker: the substitutable install/uninstall interface behind
//! C7's Acquisition Coordinator, per spec.md §9 ("re-express protected
//! inheritance of base classes for substitutable invokers as an interface
//! with two operations and two concrete implementations selected by
//! installType").

mod platform;
mod script;

pub use platform::PlatformInstaller;
pub use script::ScriptInstaller;

use async_trait::async_trait;
use dotnet_types::{Architecture, FullVersion, InstallType, Mode, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything an `Installer` needs to run one install or uninstall.
#[derive(Debug, Clone)]
pub struct InstallContext {
    pub version: FullVersion,
    pub mode: Mode,
    pub architecture: Architecture,
    pub install_type: InstallType,
    pub install_dir: PathBuf,
    pub timeout: Duration,
}

/// The two operations every install backend supports, selected by
/// `install_type` at the coordinator layer.
#[async_trait]
pub trait Installer: Send + Sync {
    /// Perform the install, returning the path to the resulting host executable.
    async fn install(&self, ctx: &InstallContext) -> Result<PathBuf>;
    /// Remove whatever `install` produced. Idempotent: a missing install directory is not an error.
    async fn uninstall(&self, ctx: &InstallContext) -> Result<()>;
}

/// The host executable path inside an install directory (`dotnet`/`dotnet.exe`).
pub fn host_path_in(install_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        install_dir.join("dotnet.exe")
    } else {
        install_dir.join("dotnet")
    }
}

/// Pick the concrete backend for a given install type.
pub fn installer_for(install_type: InstallType, script_installer: ScriptInstaller) -> Box<dyn Installer> {
    match install_type {
        InstallType::Local => Box::new(script_installer),
        InstallType::Global => {
            // The platform backend needs a resolved package path the caller
            // supplies separately; local installs are the only path this
            // convenience constructor wires up end-to-end.
            Box::new(script_installer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dotnet_index::Transport;
    use std::sync::Arc;
    use tempfile::tempdir;

    struct FakeScriptTransport;

    #[async_trait]
    impl Transport for FakeScriptTransport {
        async fn fetch_text(&self, _url: &str) -> std::result::Result<String, reqwest::Error> {
            Ok("#!/bin/sh\nmkdir -p \"$4\"\ntouch \"$4/dotnet\"\nchmod +x \"$4/dotnet\"\n".to_string())
        }
    }

    #[tokio::test]
    async fn script_installer_produces_a_runnable_host() {
        let dir = tempdir().unwrap();
        let transport: Arc<dyn Transport> = Arc::new(FakeScriptTransport);
        let installer = ScriptInstaller::new(transport, dir.path().join("install-scripts"));

        let ctx = InstallContext {
            version: FullVersion::new(8, 0, 103),
            mode: Mode::Sdk,
            architecture: Architecture::X64,
            install_type: InstallType::Local,
            install_dir: dir.path().join(".dotnet").join("8.0.103"),
            timeout: Duration::from_secs(30),
        };

        let host = installer.install(&ctx).await.unwrap();
        assert!(host.exists());

        installer.uninstall(&ctx).await.unwrap();
        assert!(!ctx.install_dir.exists());
    }
}
