use crate::arch::Architecture;
use crate::mode::{InstallType, Mode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Content-addressed key identifying a specific install configuration
/// (spec.md §3: `hash(version, architecture, mode, installType)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstallId(pub [u8; 32]);

impl InstallId {
    pub fn compute(
        version: &str,
        architecture: Architecture,
        mode: Mode,
        install_type: InstallType,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(version.as_bytes());
        hasher.update(b"\0");
        hasher.update(architecture.to_string().as_bytes());
        hasher.update(b"\0");
        hasher.update(mode.to_string().as_bytes());
        hasher.update(b"\0");
        hasher.update(install_type.to_string().as_bytes());
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        InstallId(out)
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 64 {
            return None;
        }
        let mut out = [0u8; 32];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(InstallId(out))
    }
}

impl fmt::Display for InstallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// The sum type an install id's persisted state must be, at every observable
/// moment (spec.md §3 invariant (a), tested by spec.md §8 property 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum InstallState {
    Installing {
        owning_extension_ids: Vec<String>,
        last_touched: i64,
    },
    Installed {
        owning_extension_ids: Vec<String>,
        last_touched: i64,
        directory: std::path::PathBuf,
    },
    /// `Partial` is observed only transiently by the coordinator; it is never
    /// the persisted value read back from the store (spec.md's state diagram
    /// shows `partial` collapsing to `absent` once cleanup runs). Kept here so
    /// the state machine in `dotnet-acquire` can reason about it uniformly.
    Partial {
        last_touched: i64,
    },
}

impl InstallState {
    pub fn owning_extension_ids(&self) -> &[String] {
        match self {
            InstallState::Installing { owning_extension_ids, .. }
            | InstallState::Installed { owning_extension_ids, .. } => owning_extension_ids,
            InstallState::Partial { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_id_is_deterministic() {
        let a = InstallId::compute("8.0.103", Architecture::X64, Mode::Sdk, InstallType::Local);
        let b = InstallId::compute("8.0.103", Architecture::X64, Mode::Sdk, InstallType::Local);
        assert_eq!(a, b);
    }

    #[test]
    fn install_id_distinguishes_every_component() {
        let base = InstallId::compute("8.0.103", Architecture::X64, Mode::Sdk, InstallType::Local);
        let diff_version =
            InstallId::compute("9.0.100", Architecture::X64, Mode::Sdk, InstallType::Local);
        let diff_arch =
            InstallId::compute("8.0.103", Architecture::Arm64, Mode::Sdk, InstallType::Local);
        let diff_mode =
            InstallId::compute("8.0.103", Architecture::X64, Mode::Runtime, InstallType::Local);
        let diff_type =
            InstallId::compute("8.0.103", Architecture::X64, Mode::Sdk, InstallType::Global);
        assert_ne!(base, diff_version);
        assert_ne!(base, diff_arch);
        assert_ne!(base, diff_mode);
        assert_ne!(base, diff_type);
    }
}
