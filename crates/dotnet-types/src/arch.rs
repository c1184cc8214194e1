//! Architecture vocabulary shared by the detector, enumerator, and validator.
//!
//! Re-expressed as a closed enum per spec.md §9's REDESIGN FLAG ("string-typed
//! architecture"): callers that need a string (host `--info` output, JSON
//! tracking records) go through `FromStr`/`Display` at the boundary instead of
//! passing bare strings through the core.

use std::fmt;
use std::str::FromStr;

/// CPU architecture, as reported by a host or detected from an executable header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Architecture {
    X86,
    X64,
    Arm64,
    Other,
}

impl Architecture {
    /// The architecture of the process currently running.
    pub fn current() -> Self {
        if cfg!(target_arch = "x86_64") {
            Architecture::X64
        } else if cfg!(target_arch = "aarch64") {
            Architecture::Arm64
        } else if cfg!(target_arch = "x86") {
            Architecture::X86
        } else {
            Architecture::Other
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
            Architecture::Arm64 => "arm64",
            Architecture::Other => "other",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownArchitecture;

impl fmt::Display for UnknownArchitecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized architecture string")
    }
}

impl FromStr for Architecture {
    type Err = UnknownArchitecture;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x86" | "win-x86" => Ok(Architecture::X86),
            "x64" | "amd64" | "win-x64" | "x86_64" => Ok(Architecture::X64),
            "arm64" | "aarch64" | "win-arm64" => Ok(Architecture::Arm64),
            _ => Err(UnknownArchitecture),
        }
    }
}
