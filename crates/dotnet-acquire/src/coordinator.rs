//! Acquisition Coordinator (C7): the state machine that ties every other
//! component together — resolve, dedup, lock, install, track — per spec.md
//! §4.7.

use crate::config::AcquisitionConfig;
use crate::events::{Event, EventSink, NoopEventSink};
use crate::tracking_store::TrackingStore;
use dotnet_index::{
    ChannelReleasesCache, ChannelReleasesCacheConfig, IndexCacheConfig, ReleaseIndexCache,
    ReqwestTransport, Transport,
};
use dotnet_installer::{InstallContext, Installer, ScriptInstaller};
use dotnet_lock::LockRegistry;
use dotnet_types::{
    AcquireError, AcquireRequest, AcquireResult, Architecture, InstallId, InstallState, InstallType,
    PreviewPolicy, Result, VersionSpecRequirement,
};
use futures_util::future::{FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// `AcquireError` isn't `Clone` (it wraps `io::Error`/`reqwest::Error`), so the
/// memoized future's output carries errors behind an `Arc` for sharing across
/// every joiner; `acquire()` unwraps back to a plain `AcquireError` before
/// returning.
type SharedOutput = std::result::Result<AcquireResult, Arc<AcquireError>>;
type BoxAcquireFuture = Pin<Box<dyn Future<Output = SharedOutput> + Send>>;
type SharedAcquire = Shared<BoxAcquireFuture>;

struct Inner {
    config: AcquisitionConfig,
    index: ReleaseIndexCache,
    channels: ChannelReleasesCache,
    script_installer: ScriptInstaller,
    lock_registry: LockRegistry,
    tracking: TrackingStore,
    event_sink: Arc<dyn EventSink>,
    /// In-process memoization: concurrent `acquire()` calls for the same
    /// install id within this process share one in-flight future instead of
    /// all racing into the cross-process lock (spec.md §4.7 step 1, §8
    /// property 9).
    in_flight: Mutex<HashMap<InstallId, SharedAcquire>>,
}

/// Cheaply cloneable handle to the coordinator; every clone shares the same
/// lock registry, tracking store, and in-flight map.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

impl Coordinator {
    pub fn new(config: AcquisitionConfig) -> Result<Self> {
        Self::with_event_sink(config, Arc::new(NoopEventSink))
    }

    pub fn with_event_sink(config: AcquisitionConfig, event_sink: Arc<dyn EventSink>) -> Result<Self> {
        let transport: Arc<dyn Transport> =
            Arc::new(ReqwestTransport::new(config.proxy_url.as_deref()).map_err(AcquireError::from)?);
        Self::with_transport(config, transport, event_sink)
    }

    /// Build a coordinator over a caller-supplied [`Transport`], bypassing
    /// the real network — the hook the pack's test tooling (per
    /// `dotnet_index::Transport`'s own doc comment) expects for driving C1
    /// and the install-script cache against a mock in tests.
    pub fn with_transport(
        config: AcquisitionConfig,
        transport: Arc<dyn Transport>,
        event_sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let index = ReleaseIndexCache::new(
            IndexCacheConfig {
                cache_ttl_ms: config.cache_ttl_ms,
                proxy_url: config.proxy_url.clone(),
                ..Default::default()
            },
            transport.clone(),
            config.release_index_cache_path(),
        );
        let channels = ChannelReleasesCache::new(
            ChannelReleasesCacheConfig { cache_ttl_ms: config.cache_ttl_ms, ..Default::default() },
            transport.clone(),
            config.channel_releases_cache_dir(),
        );
        let script_installer = ScriptInstaller::new(transport, config.install_scripts_dir());
        let tracking = TrackingStore::open(config.tracking_store_path())?;

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                index,
                channels,
                script_installer,
                lock_registry: LockRegistry::new(),
                tracking,
                event_sink,
                in_flight: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// spec.md §4.7: resolve, dedup, lock, install, track.
    pub async fn acquire(&self, request: AcquireRequest) -> Result<AcquireResult> {
        request.validate()?;
        self.inner.event_sink.emit(Event::AcquireStarted {
            version: request.version.clone(),
            mode: request.mode.to_string(),
        });

        for existing in self.inner.config.existing_dotnet_path.clone() {
            if self.satisfies_existing(&existing, &request).await {
                info!(path = %existing.display(), "pre-existing host satisfies request");
                self.inner.event_sink.emit(Event::PreinstallDetected { path: existing.clone() });
                return Ok(AcquireResult { dotnet_path: existing });
            }
        }

        let preview_policy = PreviewPolicy::RejectPreviews;
        let resolved = match dotnet_resolver::resolve(
            &self.inner.index,
            &self.inner.channels,
            &request.version,
            request.mode,
            preview_policy,
        )
        .await
        {
            Ok(v) => v,
            Err(error) => {
                self.inner.event_sink.emit(Event::AcquireFailed {
                    kind: "version_resolution",
                    detail: error.to_string(),
                });
                return Err(error);
            }
        };
        self.inner.event_sink.emit(Event::VersionResolution {
            spec: request.version.clone(),
            resolved: resolved.to_string(),
        });

        let architecture = request.architecture.unwrap_or_else(Architecture::current);
        let install_id =
            InstallId::compute(&resolved.to_string(), architecture, request.mode, request.install_type);

        let fut = {
            let mut in_flight = self.inner.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(existing) = in_flight.get(&install_id) {
                debug!(install_id = %install_id, "joining in-flight acquire for this process");
                existing.clone()
            } else {
                let this = self.clone();
                let resolved_str = resolved.to_string();
                let boxed: BoxAcquireFuture = Box::pin(async move {
                    this.acquire_locked(install_id, resolved_str, architecture, request)
                        .await
                        .map_err(Arc::new)
                });
                let shared = boxed.shared();
                in_flight.insert(install_id, shared.clone());
                shared
            }
        };

        let result: Result<AcquireResult> =
            fut.await.map_err(|e| AcquireError::Shared(e.to_string()));
        self.inner.in_flight.lock().unwrap_or_else(|e| e.into_inner()).remove(&install_id);

        match &result {
            Ok(r) => self.inner.event_sink.emit(Event::AcquireCompleted {
                install_id: install_id.to_hex(),
                dotnet_path: r.dotnet_path.clone(),
            }),
            Err(error) => {
                self.inner.event_sink.emit(Event::AcquireFailed { kind: "install", detail: error.to_string() })
            }
        }
        result
    }

    /// The cross-process-locked portion of `acquire`: everything from the
    /// tracking-store fast path through invoking the installer.
    async fn acquire_locked(
        &self,
        install_id: InstallId,
        resolved_version: String,
        architecture: Architecture,
        request: AcquireRequest,
    ) -> Result<AcquireResult> {
        let lock_path = self.inner.config.locks_dir().join(format!("{install_id}.lock"));
        let retry_ms = self.inner.config.lock_retry_ms;
        let timeout_ms = self.inner.config.lock_timeout_ms;

        dotnet_lock::with_lock(&self.inner.lock_registry, &lock_path, retry_ms, timeout_ms, false, || async {
            self.install_under_lock(install_id, resolved_version, architecture, request).await
        })
        .await
    }

    async fn install_under_lock(
        &self,
        install_id: InstallId,
        resolved_version: String,
        architecture: Architecture,
        request: AcquireRequest,
    ) -> Result<AcquireResult> {
        let install_dir = self.inner.config.install_root().join(&resolved_version);

        if let Some(state) = self.inner.tracking.get(install_id) {
            match state {
                InstallState::Installed { directory, .. } => {
                    let host = dotnet_installer::host_path_in(&directory);
                    if host.exists() {
                        debug!(install_id = %install_id, "already installed, returning tracked path");
                        self.inner
                            .event_sink
                            .emit(Event::AlreadyInstalled { install_id: install_id.to_hex() });
                        self.touch_owner(install_id, request.requesting_extension_id.clone())?;
                        return Ok(AcquireResult { dotnet_path: host });
                    }
                    warn!(install_id = %install_id, "tracked install missing on disk, reinstalling");
                }
                InstallState::Installing { .. } => {
                    self.inner
                        .event_sink
                        .emit(Event::PartialInstallDetected { install_id: install_id.to_hex() });
                    info!(install_id = %install_id, "recovering from a partial install left by a prior process");
                }
                InstallState::Partial { .. } => {}
            }
        }

        // Resolve the backend before touching tracking state: an
        // unsupported install type must fail closed without ever recording
        // an `Installing` entry for an install that will never be attempted.
        let installer = self.installer_for(request.install_type)?;

        self.inner.tracking.set(
            install_id,
            InstallState::Installing {
                owning_extension_ids: vec![request.requesting_extension_id.clone()],
                last_touched: now(),
            },
        )?;

        let timeout_seconds = if request.timeout_seconds > 0 {
            request.timeout_seconds
        } else {
            self.inner.config.install_timeout_seconds
        };
        let ctx = InstallContext {
            version: parse_full(&resolved_version)?,
            mode: request.mode,
            architecture,
            install_type: request.install_type,
            install_dir: install_dir.clone(),
            timeout: std::time::Duration::from_secs(timeout_seconds),
        };

        let install_result = installer.install(&ctx).await;

        match install_result {
            Ok(host) => {
                // spec.md §4.7 step 9: a freshly installed host must satisfy
                // the original request before it's recorded as `installed`.
                let requirement = request.to_requirement(
                    resolved_version.clone(),
                    VersionSpecRequirement::Equal,
                    PreviewPolicy::RejectPreviews,
                );
                if !dotnet_validate::meets(&host, &requirement).await {
                    warn!(install_id = %install_id, path = %host.display(), "freshly installed host failed validation against the original request");
                    return Err(AcquireError::InstallationValidationFailed {
                        path: host.display().to_string(),
                    });
                }

                self.inner.tracking.set(
                    install_id,
                    InstallState::Installed {
                        owning_extension_ids: vec![request.requesting_extension_id],
                        last_touched: now(),
                        directory: install_dir,
                    },
                )?;
                Ok(AcquireResult { dotnet_path: host })
            }
            Err(error) => {
                // Leave the tracking entry as `Installing`: the next
                // `acquire()` for this id will see a state that doesn't
                // match an existing install directory and treat it as the
                // transient `partial` condition spec.md's state diagram
                // describes, rather than persisting `partial` itself.
                if error.leaves_partial_install() {
                    warn!(install_id = %install_id, error = %error, "install failed, leaving partial state for next attempt to recover");
                }
                Err(error)
            }
        }
    }

    pub async fn uninstall(&self, install_id: InstallId) -> Result<()> {
        self.inner.event_sink.emit(Event::UninstallStarted { install_id: install_id.to_hex() });
        let lock_path = self.inner.config.locks_dir().join(format!("{install_id}.lock"));
        let retry_ms = self.inner.config.lock_retry_ms;
        let timeout_ms = self.inner.config.lock_timeout_ms;

        dotnet_lock::with_lock(&self.inner.lock_registry, &lock_path, retry_ms, timeout_ms, false, || async {
            if let Some(InstallState::Installed { directory, .. }) = self.inner.tracking.get(install_id) {
                if directory.exists() {
                    std::fs::remove_dir_all(&directory)?;
                }
            }
            self.inner.tracking.remove(install_id)
        })
        .await?;

        self.inner.event_sink.emit(Event::UninstallCompleted { install_id: install_id.to_hex() });
        Ok(())
    }

    /// spec.md §8 property 7: after `uninstall_all`, the tracking store holds
    /// no installed or installing entries.
    pub async fn uninstall_all(&self) -> Result<()> {
        let install_root = self.inner.config.install_root();
        if install_root.exists() {
            std::fs::remove_dir_all(&install_root)?;
        }
        self.inner.tracking.clear()
    }

    /// spec.md §2's `findPath(requirement)`: check candidate roots — the
    /// configured `existingDotnetPath` entries, then every tracked install's
    /// host — without acquiring anything.
    pub async fn find_path(&self, requirement: &dotnet_types::Requirement) -> Option<std::path::PathBuf> {
        for existing in &self.inner.config.existing_dotnet_path {
            if dotnet_validate::meets(existing, requirement).await {
                return Some(existing.clone());
            }
        }
        for (_, state) in self.inner.tracking.all() {
            if let InstallState::Installed { directory, .. } = state {
                let host = dotnet_installer::host_path_in(&directory);
                if host.exists() && dotnet_validate::meets(&host, requirement).await {
                    return Some(host);
                }
            }
        }
        None
    }

    /// spec.md §4.7's final step: report every tracked install.
    pub fn list(&self) -> Vec<(InstallId, InstallState)> {
        self.inner.tracking.all()
    }

    /// `ScriptInstaller` only implements the `local` install type (it asserts
    /// as much internally); `global` needs a `PlatformInstaller` backed by a
    /// separately resolved OS package path this request shape doesn't carry,
    /// so it's rejected here with a typed error rather than routed to a
    /// backend that would panic on it.
    fn installer_for(&self, install_type: InstallType) -> Result<&dyn Installer> {
        match install_type {
            InstallType::Local => Ok(&self.inner.script_installer),
            InstallType::Global => Err(AcquireError::UnsupportedMode {
                mode: "installType=global (no platform package installer wired)".to_string(),
            }),
        }
    }

    fn touch_owner(&self, install_id: InstallId, extension_id: String) -> Result<()> {
        if let Some(InstallState::Installed { mut owning_extension_ids, directory, .. }) =
            self.inner.tracking.get(install_id)
        {
            if !owning_extension_ids.contains(&extension_id) {
                owning_extension_ids.push(extension_id);
            }
            self.inner.tracking.set(
                install_id,
                InstallState::Installed { owning_extension_ids, last_touched: now(), directory },
            )?;
        }
        Ok(())
    }

    async fn satisfies_existing(&self, host: &std::path::Path, request: &AcquireRequest) -> bool {
        let requirement = request.to_requirement(
            request.version.clone(),
            VersionSpecRequirement::GreaterThanOrEqual,
            PreviewPolicy::RejectPreviews,
        );
        dotnet_validate::meets(host, &requirement).await || self.inner.config.allow_invalid_paths
    }
}

fn now() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}

fn parse_full(version: &str) -> Result<dotnet_types::FullVersion> {
    match dotnet_resolver::parse(version)? {
        dotnet_types::VersionSpec::Full(v) => Ok(v),
        other => Err(AcquireError::InvalidVersion {
            version: version.to_string(),
            reason: format!("resolved version spec was not fully specified: {other}"),
        }),
    }
}
