//! Layered `AcquisitionConfig`, covering every row of spec.md §4.7's
//! configuration table: defaults, overridden by `DOTNET_ACQUIRE_*`
//! environment variables, overridden again by whatever the embedder sets
//! programmatically before constructing the coordinator. No external
//! layering crate — plain `serde`-free struct-with-defaults, matching the
//! teacher's convention in its own config modules.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Hard ceiling on any single install invocation.
    pub install_timeout_seconds: u64,
    /// Routes network fetches (release index, install scripts) through an HTTP proxy.
    pub proxy_url: Option<String>,
    /// Ordered list of externally provided hosts tried before installing.
    pub existing_dotnet_path: Vec<PathBuf>,
    /// If false, reject `existing_dotnet_path` entries that don't satisfy C5.
    pub allow_invalid_paths: bool,
    /// Whether the event stream forwards to telemetry (no telemetry backend
    /// is implemented here; this just gates whether the coordinator asks its
    /// configured `EventSink` to do so).
    pub enable_telemetry: bool,
    /// Max age at which the release index is served without refresh.
    pub cache_ttl_ms: u64,
    /// Root of the tool-owned storage tree (`<storage>/.dotnet`, `<storage>/locks`, etc).
    pub storage_root: PathBuf,
    /// Lock retry/timeout, passed through to C6.
    pub lock_retry_ms: u64,
    pub lock_timeout_ms: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        let storage_root = dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("dnvm");
        Self {
            install_timeout_seconds: 300,
            proxy_url: None,
            existing_dotnet_path: Vec::new(),
            allow_invalid_paths: false,
            enable_telemetry: false,
            cache_ttl_ms: 4 * 60 * 60 * 1000,
            storage_root,
            lock_retry_ms: 100,
            lock_timeout_ms: 10_000,
        }
    }
}

impl AcquisitionConfig {
    /// Overlay `DOTNET_ACQUIRE_*` environment variables on top of [`Default`].
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay `DOTNET_ACQUIRE_*` environment variables on top of `self`,
    /// leaving fields whose variable is unset or unparsable untouched.
    pub fn apply_env(&mut self) {
        if let Some(v) = env_u64("DOTNET_ACQUIRE_INSTALL_TIMEOUT_SECONDS") {
            self.install_timeout_seconds = v;
        }
        if let Ok(v) = std::env::var("DOTNET_ACQUIRE_PROXY_URL") {
            if !v.is_empty() {
                self.proxy_url = Some(v);
            }
        }
        if let Ok(v) = std::env::var("DOTNET_ACQUIRE_EXISTING_DOTNET_PATH") {
            self.existing_dotnet_path =
                std::env::split_paths(&v).filter(|p| !p.as_os_str().is_empty()).collect();
        }
        if let Some(v) = env_bool("DOTNET_ACQUIRE_ALLOW_INVALID_PATHS") {
            self.allow_invalid_paths = v;
        }
        if let Some(v) = env_bool("DOTNET_ACQUIRE_ENABLE_TELEMETRY") {
            self.enable_telemetry = v;
        }
        if let Some(v) = env_u64("DOTNET_ACQUIRE_CACHE_TTL_MS") {
            self.cache_ttl_ms = v;
        }
        if let Ok(v) = std::env::var("DOTNET_ACQUIRE_STORAGE_ROOT") {
            if !v.is_empty() {
                self.storage_root = PathBuf::from(v);
            }
        }
    }

    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_seconds)
    }

    pub fn install_root(&self) -> PathBuf {
        self.storage_root.join(".dotnet")
    }

    pub fn locks_dir(&self) -> PathBuf {
        self.storage_root.join("locks")
    }

    pub fn release_index_cache_path(&self) -> PathBuf {
        self.storage_root.join("releases.json")
    }

    pub fn channel_releases_cache_dir(&self) -> PathBuf {
        self.storage_root.join("channel-releases")
    }

    pub fn install_scripts_dir(&self) -> PathBuf {
        self.storage_root.join("install-scripts")
    }

    pub fn tracking_store_path(&self) -> PathBuf {
        self.storage_root.join("tracking.json")
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    })
}
