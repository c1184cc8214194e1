//! Fire-and-forget tagged event stream (spec.md §6), decoupled from the
//! `tracing` log lines the coordinator also emits at each decision point —
//! this is the channel an embedder can wire to telemetry or UI, the logging
//! is the always-on local sink.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum Event {
    AcquireStarted { version: String, mode: String },
    AcquireCompleted { install_id: String, dotnet_path: PathBuf },
    AcquireFailed { kind: &'static str, detail: String },
    UninstallStarted { install_id: String },
    UninstallCompleted { install_id: String },
    VersionResolution { spec: String, resolved: String },
    WebRequest { error: String },
    PartialInstallDetected { install_id: String },
    AlreadyInstalled { install_id: String },
    PreinstallDetected { path: PathBuf },
    ConditionsValidated { satisfied: bool },
    UnableToCheckArchitecture { path: PathBuf },
}

/// Receives the tagged event stream. The coordinator calls this alongside
/// (not instead of) its own `tracing` events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Default sink: drops everything. Used when no embedder-supplied sink is configured.
#[derive(Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: Event) {}
}

/// Forwards every event into `tracing`, for embedders that just want the
/// tagged stream to show up in their existing log pipeline.
#[derive(Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: Event) {
        match event {
            Event::AcquireStarted { version, mode } => {
                tracing::info!(version, mode, "acquire started")
            }
            Event::AcquireCompleted { install_id, dotnet_path } => {
                tracing::info!(install_id, path = %dotnet_path.display(), "acquire completed")
            }
            Event::AcquireFailed { kind, detail } => {
                tracing::warn!(kind, detail, "acquire failed")
            }
            Event::UninstallStarted { install_id } => tracing::info!(install_id, "uninstall started"),
            Event::UninstallCompleted { install_id } => {
                tracing::info!(install_id, "uninstall completed")
            }
            Event::VersionResolution { spec, resolved } => {
                tracing::debug!(spec, resolved, "version resolved")
            }
            Event::WebRequest { error } => tracing::warn!(error, "web request failed"),
            Event::PartialInstallDetected { install_id } => {
                tracing::warn!(install_id, "partial install detected, recovering")
            }
            Event::AlreadyInstalled { install_id } => tracing::debug!(install_id, "already installed"),
            Event::PreinstallDetected { path } => {
                tracing::debug!(path = %path.display(), "pre-existing host satisfies requirement")
            }
            Event::ConditionsValidated { satisfied } => {
                tracing::debug!(satisfied, "conditions validated")
            }
            Event::UnableToCheckArchitecture { path } => {
                tracing::warn!(path = %path.display(), "unable to check architecture")
            }
        }
    }
}
