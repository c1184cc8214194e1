use crate::arch::Architecture;
use crate::mode::{InstallType, Mode};
use crate::version::{PreviewPolicy, VersionSpecRequirement};
use std::path::PathBuf;

/// Configuration for how acquisition errors are reported to the caller.
/// Mirrors spec.md §3's `errorConfiguration` field: the core never renders
/// dialog text itself (spec.md §7), it only decides whether to surface or swallow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorConfiguration {
    pub show_output_channel: bool,
}

/// `acquire(request)`'s input, per spec.md §3.
#[derive(Debug, Clone)]
pub struct AcquireRequest {
    /// Loose version spec string, e.g. `"8.0"`, `"6.0.3xx"`, `"8.0.103"`.
    pub version: String,
    pub requesting_extension_id: String,
    pub mode: Mode,
    pub install_type: InstallType,
    pub architecture: Option<Architecture>,
    pub error_configuration: ErrorConfiguration,
    pub rethrow_error: bool,
    pub timeout_seconds: u64,
}

impl AcquireRequest {
    /// Invariant from spec.md §3: `version` non-empty and not the literal `"latest"`.
    pub fn validate(&self) -> Result<(), crate::error::AcquireError> {
        if self.version.trim().is_empty() || self.version.eq_ignore_ascii_case("latest") {
            return Err(crate::error::AcquireError::InvalidVersion {
                version: self.version.clone(),
                reason: "version must be non-empty and not the literal 'latest'".into(),
            });
        }
        if self.requesting_extension_id.trim().is_empty() {
            return Err(crate::error::AcquireError::MissingRequestField {
                field: "requestingExtensionId".into(),
            });
        }
        Ok(())
    }

    /// Project this request into a `Requirement` for C5, once a version has resolved.
    pub fn to_requirement(
        &self,
        resolved_version: String,
        version_spec_requirement: VersionSpecRequirement,
        preview_policy: PreviewPolicy,
    ) -> Requirement {
        Requirement {
            version: resolved_version,
            mode: self.mode,
            architecture: self.architecture,
            version_spec_requirement,
            preview_policy,
        }
    }
}

/// C5's input: a structured version requirement against which a host is checked.
#[derive(Debug, Clone)]
pub struct Requirement {
    pub version: String,
    pub mode: Mode,
    pub architecture: Option<Architecture>,
    pub version_spec_requirement: VersionSpecRequirement,
    pub preview_policy: PreviewPolicy,
}

/// `acquire(request)`'s successful output: the absolute path to the host executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireResult {
    pub dotnet_path: PathBuf,
}
