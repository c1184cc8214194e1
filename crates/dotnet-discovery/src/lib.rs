//! Installation Enumerator (C4): lists installed SDKs/runtimes by invoking a
//! host's `--list-sdks`/`--list-runtimes` surface, per spec.md §4.3.

mod env_guard;
mod parse;

use dotnet_types::{Architecture, InstalledRecord, Mode};
use env_guard::MultiLevelLookupGuard;
use std::path::Path;
use std::process::Output;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// The result of resolving a host's architecture when C3's static detection
/// couldn't classify the binary — spec.md §4.3's `--info` fallback, with the
/// empty-string-is-permissive vs. strict-unknown-never-matches split spec.md
/// §9's open question resolves by making strict mode opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostArchProbe {
    Known(Architecture),
    /// Couldn't determine it, non-strict mode: treated as "any" in comparisons.
    Permissive,
    /// Couldn't determine it, strict mode: never compares equal.
    NeverMatches,
}

/// spec.md §4.3: `list(hostPath, mode, requestedArch?) -> [InstalledRecord]`.
/// Never fails — a missing host, a non-zero exit, or unparsable output all
/// degrade to an empty list, per spec.md §7's discovery-failure policy.
pub async fn list(
    host_path: &Path,
    mode: Mode,
    requested_arch: Option<Architecture>,
) -> Vec<InstalledRecord> {
    let detected_arch = dotnet_arch::detect(host_path);
    let invocation_arch = requested_arch.or_else(|| Some(Architecture::current()));

    let _guard = MultiLevelLookupGuard::disable().await;

    let list_flag = if mode.is_sdk() { "--list-sdks" } else { "--list-runtimes" };
    let mut args: Vec<String> = vec![list_flag.to_string()];
    if let Some(arch) = invocation_arch {
        args.push("--arch".to_string());
        args.push(arch.to_string());
    }

    let output = match run(host_path, &args).await {
        Some(output) => output,
        None => {
            warn!(host = %host_path.display(), "host not found or failed to spawn");
            return Vec::new();
        }
    };

    if !output.status.success() {
        debug!(host = %host_path.display(), "host exited non-zero for listing invocation");
        return Vec::new();
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut records: Vec<InstalledRecord> = stdout
        .lines()
        .filter_map(|line| {
            let (version, directory) = if mode.is_sdk() {
                parse::sdk_line(line)?
            } else {
                parse::runtime_line(line, mode)?
            };
            Some(InstalledRecord { mode, version, directory, architecture: None })
        })
        .collect();

    let final_arch = match detected_arch {
        Some(arch) => Some(arch),
        None => {
            if arch_flag_plausibly_supported(&stdout) && probe_arch_flag(host_path).await {
                invocation_arch
            } else {
                None
            }
        }
    };
    for record in &mut records {
        record.architecture = final_arch;
    }

    records
}

/// spec.md §4.3's `--arch` capability probe: a host that supports the flag
/// exits non-zero for a bogus value; one that silently ignores it exits zero.
async fn probe_arch_flag(host_path: &Path) -> bool {
    let probe_args = ["--list-runtimes".to_string(), "--arch".to_string(), "invalid-arch".to_string()];
    match run(host_path, &probe_args).await {
        Some(output) => !output.status.success(),
        None => false,
    }
}

/// Avoid the extra process spawn for the common case: only bother probing
/// when the listing output looks like a ≥10.0 host, or wall-clock has
/// crossed the point where pre-`--arch` hosts are rare.
fn arch_flag_plausibly_supported(stdout: &str) -> bool {
    let looks_modern = stdout.lines().any(|line| {
        line.split_whitespace()
            .filter_map(|tok| tok.split('.').next())
            .filter_map(|major| major.parse::<u32>().ok())
            .any(|major| major >= 10)
    });
    looks_modern || past_dotnet10_ga()
}

/// .NET 10's GA date (2025-11-11), below which `--arch` support can't be assumed.
const DOTNET_10_GA_UNIX_SECS: u64 = 1_762_819_200;

fn past_dotnet10_ga() -> bool {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() >= DOTNET_10_GA_UNIX_SECS)
        .unwrap_or(false)
}

/// spec.md §4.3's fallback for an unknown host architecture: invoke `--info`
/// with English output forced, and scan for the `Architecture:` line.
pub async fn info_fallback_architecture(host_path: &Path, strict: bool) -> HostArchProbe {
    let mut cmd = tokio::process::Command::new(host_path);
    cmd.arg("--info");
    cmd.env("DOTNET_CLI_UI_LANGUAGE", "en");
    let output = match cmd.output().await {
        Ok(output) if output.status.success() => output,
        _ => {
            warn!(host = %host_path.display(), "unable to check architecture via --info");
            return if strict { HostArchProbe::NeverMatches } else { HostArchProbe::Permissive };
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let token = stdout.lines().find_map(|line| {
        let line = line.trim();
        line.strip_prefix("Architecture:").map(|rest| rest.trim().to_string())
    });

    match token.and_then(|t| t.parse::<Architecture>().ok()) {
        Some(arch) => HostArchProbe::Known(arch),
        None => {
            warn!(host = %host_path.display(), "--info output had no recognizable Architecture: line");
            if strict {
                HostArchProbe::NeverMatches
            } else {
                HostArchProbe::Permissive
            }
        }
    }
}

async fn run(host_path: &Path, args: &[String]) -> Option<Output> {
    tokio::process::Command::new(host_path).args(args).output().await.ok()
}
