//! The error taxonomy of spec.md §7, one `thiserror` enum per category so
//! callers can match on a machine-readable kind instead of a message string
//! (spec.md: "errors carry a machine-readable kind and a human-readable
//! message; the core never produces dialog text itself").

/// Result type alias used throughout the acquisition core.
pub type Result<T> = std::result::Result<T, AcquireError>;

#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    // --- Input validation ---
    #[error("invalid version spec '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("missing required field: {field}")]
    MissingRequestField { field: String },

    #[error("unsupported mode: {mode}")]
    UnsupportedMode { mode: String },

    // --- Resolution failures ---
    #[error("release index unavailable: no cache and network fetch failed ({reason})")]
    ReleaseIndexUnavailable { reason: String },

    #[error("version resolution failed for spec '{spec}': {reason}")]
    VersionResolutionFailed { spec: String, reason: String },

    // --- Installation failures ---
    #[error("install script failed: {stderr}")]
    InstallScriptError { stderr: String },

    #[error("installer exited with code {code}")]
    InstallExitNonZero { code: i32 },

    #[error("install timed out after {timeout_seconds}s")]
    InstallTimeout { timeout_seconds: u64 },

    #[error("install cancelled by caller")]
    UserCancelled,

    #[error("installed host at {path} does not satisfy the original request")]
    InstallationValidationFailed { path: String },

    // --- Discovery failures (non-fatal; logged, evaluate to "does not satisfy") ---
    #[error("unable to check architecture of host at {path}")]
    UnableToCheckArchitecture { path: String },

    #[error("host not found at {path}")]
    HostNotFound { path: String },

    // --- State failures ---
    #[error("tracking state corrupted for install id {install_id}: {reason}")]
    TrackingCorruption { install_id: String, reason: String },

    // --- Concurrency failures ---
    #[error("lock timeout after {timeout_ms}ms acquiring {lock_path}")]
    LockTimeout { lock_path: String, timeout_ms: u64 },

    #[error("lock io error on {lock_path}: {source}")]
    LockIoError {
        lock_path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Re-surfaced when a caller joins an in-process in-flight `acquire()`
    /// that another caller originated and it failed — the original error may
    /// not itself be `Clone` (e.g. it wraps an `io::Error`), so joiners see
    /// its message rather than the original typed variant.
    #[error("{0}")]
    Shared(String),
}

impl AcquireError {
    /// spec.md §7: C3/C4/C5 never raise for "not found"/"cannot determine" —
    /// those states aren't represented as `AcquireError` at all (they're
    /// `None`/`false`/empty-`Vec` returns). This flags the subset of
    /// `AcquireError` variants that are themselves non-fatal when they do
    /// occur during discovery (e.g. surfaced as an event, not aborting the
    /// whole acquire).
    pub fn is_discovery_failure(&self) -> bool {
        matches!(
            self,
            AcquireError::UnableToCheckArchitecture { .. } | AcquireError::HostNotFound { .. }
        )
    }

    /// spec.md §4.7 step 9 / §7: failures after which the install id should
    /// transition to `partial` rather than being left `installing` forever.
    pub fn leaves_partial_install(&self) -> bool {
        matches!(
            self,
            AcquireError::InstallScriptError { .. }
                | AcquireError::InstallExitNonZero { .. }
                | AcquireError::InstallTimeout { .. }
                | AcquireError::UserCancelled
                | AcquireError::InstallationValidationFailed { .. }
        )
    }
}
