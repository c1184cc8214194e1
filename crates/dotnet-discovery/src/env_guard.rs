//! Scoped mutation of the multi-level lookup environment variable (spec.md
//! §4.3 rule 2), re-expressed as an explicit RAII guard rather than a
//! fire-and-forget global mutation, per spec.md §9's guidance against mutable
//! global singletons.

use tokio::sync::{Mutex, MutexGuard};

const MULTILEVEL_LOOKUP_VAR: &str = "DOTNET_MULTILEVEL_LOOKUP";

/// Serializes every call that touches the multi-level lookup variable —
/// environment mutation is process-global, so concurrent `list()` calls must
/// not race setting and restoring it. A `tokio::sync::Mutex` rather than
/// `std::sync::Mutex` so the held guard stays `Send` across the `.await`
/// points in `list()`'s body, letting callers drive this from a future that
/// itself needs to be `Send` (e.g. C7's in-process memoized acquire future).
static ENV_LOCK: Mutex<()> = Mutex::const_new(());

pub struct MultiLevelLookupGuard {
    previous: Option<String>,
    _lock: MutexGuard<'static, ()>,
}

impl MultiLevelLookupGuard {
    pub async fn disable() -> Self {
        let lock = ENV_LOCK.lock().await;
        let previous = std::env::var(MULTILEVEL_LOOKUP_VAR).ok();
        std::env::set_var(MULTILEVEL_LOOKUP_VAR, "0");
        Self { previous, _lock: lock }
    }
}

impl Drop for MultiLevelLookupGuard {
    fn drop(&mut self) {
        match &self.previous {
            Some(v) => std::env::set_var(MULTILEVEL_LOOKUP_VAR, v),
            None => std::env::remove_var(MULTILEVEL_LOOKUP_VAR),
        }
    }
}
