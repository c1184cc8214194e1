//! Subcommand handlers. Each parses its clap arguments into the acquisition
//! core's request/requirement types and prints a result, matching the
//! teacher's convention of one handler function per `Commands` variant.

use anyhow::{bail, Context, Result};
use dotnet_acquire::{AcquisitionConfig, Coordinator};
use dotnet_types::{
    AcquireRequest, Architecture, ErrorConfiguration, InstallId, InstallType, Mode, PreviewPolicy,
    Requirement, VersionSpecRequirement,
};
use std::str::FromStr;

fn parse_mode(mode: &str) -> Result<Mode> {
    match mode {
        "sdk" => Ok(Mode::Sdk),
        "runtime" => Ok(Mode::Runtime),
        "aspnetcore" => Ok(Mode::AspNetCore),
        other => bail!("unknown mode '{other}', expected sdk, runtime, or aspnetcore"),
    }
}

fn parse_install_type(install_type: &str) -> Result<InstallType> {
    match install_type {
        "local" => Ok(InstallType::Local),
        "global" => Ok(InstallType::Global),
        other => bail!("unknown install type '{other}', expected local or global"),
    }
}

fn parse_arch(arch: &Option<String>) -> Result<Option<Architecture>> {
    arch.as_deref()
        .map(|a| Architecture::from_str(a).map_err(|e| anyhow::anyhow!("unknown architecture '{a}': {e}")))
        .transpose()
}

pub async fn acquire(
    version: String,
    requesting_extension_id: String,
    mode: String,
    install_type: String,
    architecture: Option<String>,
    timeout_seconds: u64,
) -> Result<()> {
    let coordinator = Coordinator::new(AcquisitionConfig::from_env()).context("building coordinator")?;
    let request = AcquireRequest {
        version,
        requesting_extension_id,
        mode: parse_mode(&mode)?,
        install_type: parse_install_type(&install_type)?,
        architecture: parse_arch(&architecture)?,
        error_configuration: ErrorConfiguration::default(),
        rethrow_error: true,
        timeout_seconds,
    };
    let result = coordinator.acquire(request).await?;
    println!("{}", result.dotnet_path.display());
    Ok(())
}

pub async fn find_path(version: String, mode: String, architecture: Option<String>) -> Result<()> {
    let coordinator = Coordinator::new(AcquisitionConfig::from_env()).context("building coordinator")?;
    let requirement = Requirement {
        version,
        mode: parse_mode(&mode)?,
        architecture: parse_arch(&architecture)?,
        version_spec_requirement: VersionSpecRequirement::GreaterThanOrEqual,
        preview_policy: PreviewPolicy::RejectPreviews,
    };
    match coordinator.find_path(&requirement).await {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => bail!("no installed host satisfies the requirement"),
    }
}

pub async fn uninstall(install_id: String) -> Result<()> {
    let id = InstallId::from_hex(&install_id).context("install id must be a 64-character hex string")?;
    let coordinator = Coordinator::new(AcquisitionConfig::from_env()).context("building coordinator")?;
    coordinator.uninstall(id).await?;
    Ok(())
}

pub async fn uninstall_all() -> Result<()> {
    let coordinator = Coordinator::new(AcquisitionConfig::from_env()).context("building coordinator")?;
    coordinator.uninstall_all().await?;
    Ok(())
}

pub fn list() -> Result<()> {
    let coordinator = Coordinator::new(AcquisitionConfig::from_env()).context("building coordinator")?;
    let entries: Vec<_> = coordinator
        .list()
        .into_iter()
        .map(|(id, state)| serde_json::json!({"installId": id.to_hex(), "state": state_json(&state)}))
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn state_json(state: &dotnet_types::InstallState) -> serde_json::Value {
    match state {
        dotnet_types::InstallState::Installing { owning_extension_ids, last_touched } => {
            serde_json::json!({"status": "installing", "owningExtensionIds": owning_extension_ids, "lastTouched": last_touched})
        }
        dotnet_types::InstallState::Installed { owning_extension_ids, last_touched, directory } => {
            serde_json::json!({
                "status": "installed",
                "owningExtensionIds": owning_extension_ids,
                "lastTouched": last_touched,
                "directory": directory.display().to_string(),
            })
        }
        dotnet_types::InstallState::Partial { last_touched } => {
            serde_json::json!({"status": "partial", "lastTouched": last_touched})
        }
    }
}
