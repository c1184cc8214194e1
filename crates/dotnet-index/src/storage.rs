//! Atomic on-disk persistence for the release index document.
//!
//! Grounded on the teacher's `vx_cache::file` helpers: write to a `.tmp`
//! sibling, then rename over the destination so readers never observe a
//! partially-written file (spec.md §4.1: "atomically replace the persisted
//! copy (write temp → rename)").

use std::path::Path;
use std::time::SystemTime;

pub fn atomic_write_bytes(dest: &Path, data: &[u8]) -> std::io::Result<()> {
    let tmp = dest.with_extension("tmp");
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&tmp, data)?;
    if dest.exists() {
        let _ = std::fs::remove_file(dest);
    }
    std::fs::rename(&tmp, dest)
}

/// Age of `path`'s contents, or `None` if it doesn't exist.
pub fn age(path: &Path) -> Option<std::time::Duration> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    SystemTime::now().duration_since(modified).ok()
}

pub fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
