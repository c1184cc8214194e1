use std::fmt;

/// What the caller wants installed: the SDK or one of the two runtime flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Runtime,
    AspNetCore,
    Sdk,
}

impl Mode {
    /// The `--list-sdks` / `--list-runtimes` family this mode enumerates under.
    pub fn is_sdk(&self) -> bool {
        matches!(self, Mode::Sdk)
    }

    /// The `Microsoft.*.App` family string a `--list-runtimes` line must carry
    /// to belong to this mode. SDKs are not listed by family (see spec.md §4.3).
    pub fn runtime_family(&self) -> Option<&'static str> {
        match self {
            Mode::Runtime => Some("Microsoft.NETCore.App"),
            Mode::AspNetCore => Some("Microsoft.AspNetCore.App"),
            Mode::Sdk => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Runtime => "runtime",
            Mode::AspNetCore => "aspnetcore",
            Mode::Sdk => "sdk",
        };
        write!(f, "{s}")
    }
}

/// Where an install lives: under the tool-owned directory tree, or installed
/// globally via the platform's native installer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallType {
    Local,
    Global,
}

impl fmt::Display for InstallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstallType::Local => "local",
            InstallType::Global => "global",
        };
        write!(f, "{s}")
    }
}
