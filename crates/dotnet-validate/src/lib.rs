//! Condition Validator (C5): does an installed host satisfy a structured
//! version/architecture/mode requirement, per spec.md §4.5.

mod lattice;

use dotnet_discovery::HostArchProbe;
use dotnet_types::{Architecture, Mode, Requirement, VersionSpec};
use lattice::{AvailableComponents, RequiredComponents};
use std::path::Path;
use tracing::debug;

/// spec.md §4.5: `meets(hostPath, requirement) -> bool`. Never raises — an
/// unparsable requirement or a host that can't be enumerated both evaluate
/// to "does not satisfy".
pub async fn meets(host_path: &Path, requirement: &Requirement) -> bool {
    let required_spec = match dotnet_resolver::parse(&requirement.version) {
        Ok(spec) => spec,
        Err(error) => {
            debug!(%error, version = %requirement.version, "requirement version does not parse, condition fails");
            return false;
        }
    };
    let required = RequiredComponents::from_spec(&required_spec, requirement.mode);

    let installs = dotnet_discovery::list(host_path, requirement.mode, requirement.architecture).await;

    for install in &installs {
        if !mode_matches(requirement.mode, install.mode) {
            continue;
        }
        if !arch_matches(requirement.architecture, install.architecture) {
            continue;
        }

        let available_version = match dotnet_resolver::parse(&install.version) {
            Ok(VersionSpec::Full(v)) => v,
            _ => continue,
        };
        if available_version.is_preview()
            && requirement.preview_policy == dotnet_types::PreviewPolicy::RejectPreviews
        {
            continue;
        }

        let available = AvailableComponents::from_full(&available_version, requirement.mode);
        if required.matches(&available, requirement.version_spec_requirement) {
            debug!(host = %host_path.display(), version = %install.version, "condition satisfied");
            return true;
        }
    }

    debug!(host = %host_path.display(), version = %requirement.version, "condition not satisfied by any install");
    false
}

/// spec.md §4.5's arch rule: no requirement, or an unknown (permissive)
/// observed architecture, or an exact normalized match.
fn arch_matches(required: Option<Architecture>, observed: Option<Architecture>) -> bool {
    match (required, observed) {
        (None, _) => true,
        (Some(_), None) => true,
        (Some(r), Some(o)) => r == o,
    }
}

/// Whether `observed` satisfies `required` per spec.md §4.5 step 3's "mode
/// matches (or request is SDK)" — defensive, since `dotnet_discovery::list`
/// is already called with `requirement.mode` and returns installs of that mode.
fn mode_matches(required: Mode, observed: Mode) -> bool {
    required == observed || required == Mode::Sdk
}

/// spec.md §4.5 step 2: resolve the host's architecture for logging/UI
/// purposes, preferring a listed install's architecture, falling back to the
/// `--info` probe (C4). Not required by `meets` itself (which per-install
/// compares observed vs. required directly), but exposed for callers (C7)
/// that need a single representative architecture for the host.
pub async fn resolve_host_architecture(host_path: &Path, strict_unknown: bool) -> HostArchProbe {
    let sdks = dotnet_discovery::list(host_path, Mode::Sdk, None).await;
    if let Some(arch) = sdks.iter().find_map(|r| r.architecture) {
        return HostArchProbe::Known(arch);
    }
    dotnet_discovery::info_fallback_architecture(host_path, strict_unknown).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotnet_types::{PreviewPolicy, VersionSpecRequirement};
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::NamedTempFile;

    fn fake_host(body: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "#!/bin/sh\n{body}").unwrap();
        let mut perms = f.as_file().metadata().unwrap().permissions();
        perms.set_mode(0o755);
        f.as_file().set_permissions(perms).unwrap();
        f
    }

    #[tokio::test]
    async fn satisfied_when_listed_runtime_meets_requirement() {
        let host = fake_host(
            r#"echo "Microsoft.NETCore.App 8.0.5 [/x/shared/Microsoft.NETCore.App]""#,
        );
        let requirement = Requirement {
            version: "8.0.3".to_string(),
            mode: Mode::Runtime,
            architecture: None,
            version_spec_requirement: VersionSpecRequirement::GreaterThanOrEqual,
            preview_policy: PreviewPolicy::RejectPreviews,
        };
        assert!(meets(host.path(), &requirement).await);
    }

    #[tokio::test]
    async fn not_satisfied_when_patch_mismatch_on_equal() {
        let host = fake_host(
            r#"echo "Microsoft.NETCore.App 8.0.5 [/x/shared/Microsoft.NETCore.App]""#,
        );
        let requirement = Requirement {
            version: "8.0.3".to_string(),
            mode: Mode::Runtime,
            architecture: None,
            version_spec_requirement: VersionSpecRequirement::Equal,
            preview_policy: PreviewPolicy::RejectPreviews,
        };
        assert!(!meets(host.path(), &requirement).await);
    }

    #[tokio::test]
    async fn malformed_requirement_version_fails_closed() {
        let host = fake_host(r#"echo "8.0.103 [/x]""#);
        let requirement = Requirement {
            version: "foo".to_string(),
            mode: Mode::Sdk,
            architecture: None,
            version_spec_requirement: VersionSpecRequirement::Equal,
            preview_policy: PreviewPolicy::RejectPreviews,
        };
        assert!(!meets(host.path(), &requirement).await);
    }
}
