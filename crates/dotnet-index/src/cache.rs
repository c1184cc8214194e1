//! Stale-while-revalidate release index cache (C1), per spec.md §4.1.

use crate::storage;
use crate::transport::Transport;
use dotnet_types::{AcquireError, ReleaseIndexDocument, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct IndexCacheConfig {
    pub url: String,
    pub cache_ttl_ms: u64,
    pub proxy_url: Option<String>,
}

impl Default for IndexCacheConfig {
    fn default() -> Self {
        Self {
            url: "https://raw.githubusercontent.com/dotnet/core/main/release-notes/releases-index.json"
                .to_string(),
            cache_ttl_ms: 4 * 60 * 60 * 1000, // 4 hours, matching the teacher's default cache window
            proxy_url: None,
        }
    }
}

pub struct ReleaseIndexCache {
    config: IndexCacheConfig,
    transport: Arc<dyn Transport>,
    cache_path: PathBuf,
    /// Tracks whether `fetch()` has been called yet in this process's
    /// lifetime — spec.md §4.1's "first call" distinction is process-scoped,
    /// not per-instance-construction, so this is the one piece of real
    /// process-wide state this crate owns; it's held behind an explicit
    /// struct field per spec.md §9's "pass a handle, don't reach for a
    /// global" guidance rather than a `static`.
    first_call: AtomicBool,
}

impl ReleaseIndexCache {
    pub fn new(config: IndexCacheConfig, transport: Arc<dyn Transport>, cache_path: PathBuf) -> Self {
        Self { config, transport, cache_path, first_call: AtomicBool::new(true) }
    }

    pub async fn fetch(&self) -> Result<ReleaseIndexDocument> {
        let is_first_call = self.first_call.swap(false, Ordering::SeqCst);
        let age = storage::age(&self.cache_path);
        let ttl = Duration::from_millis(self.config.cache_ttl_ms);

        if is_first_call {
            if let Some(age) = age {
                if age < ttl {
                    let doc = self.load_persisted()?;
                    self.spawn_background_refresh();
                    return Ok(doc);
                }
            }
        } else if let Some(age) = age {
            if age < ttl {
                return self.load_persisted();
            }
        }

        self.fetch_fresh_or_fall_back_to_cache().await
    }

    fn load_persisted(&self) -> Result<ReleaseIndexDocument> {
        let raw = std::fs::read_to_string(&self.cache_path)?;
        ReleaseIndexDocument::parse(&raw).map_err(AcquireError::from)
    }

    async fn fetch_fresh_or_fall_back_to_cache(&self) -> Result<ReleaseIndexDocument> {
        match self.fetch_and_persist().await {
            Ok(doc) => Ok(doc),
            Err(network_err) => {
                if self.cache_path.exists() {
                    warn!(error = %network_err, "release index fetch failed, serving stale cache");
                    self.load_persisted()
                } else {
                    Err(AcquireError::ReleaseIndexUnavailable { reason: network_err.to_string() })
                }
            }
        }
    }

    async fn fetch_and_persist(&self) -> Result<ReleaseIndexDocument> {
        use backon::{ExponentialBuilder, Retryable};

        let transport = self.transport.clone();
        let url = self.config.url.clone();
        let raw = (|| {
            let transport = transport.clone();
            let url = url.clone();
            async move { transport.fetch_text(&url).await }
        })
        .retry(ExponentialBuilder::default().with_max_times(3))
        .await
        .map_err(AcquireError::Http)?;

        let doc = ReleaseIndexDocument::parse(&raw)?;
        storage::atomic_write_bytes(&self.cache_path, raw.as_bytes())?;
        Ok(doc)
    }

    fn spawn_background_refresh(&self) {
        // Fire-and-forget: a failure here is silently absorbed, the next
        // `fetch()` either sees a refreshed cache or falls back to what's
        // already on disk. We can't hold `&self` across a spawned task, so
        // clone the pieces the refresh needs.
        let transport = self.transport.clone();
        let url = self.config.url.clone();
        let cache_path = self.cache_path.clone();
        tokio::spawn(async move {
            match transport.fetch_text(&url).await {
                Ok(raw) => {
                    if ReleaseIndexDocument::parse(&raw).is_ok() {
                        if let Err(e) = storage::atomic_write_bytes(&cache_path, raw.as_bytes()) {
                            warn!(error = %e, "background release index refresh: failed to persist");
                        }
                    }
                }
                Err(e) => warn!(error = %e, "background release index refresh failed"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct StaticTransport {
        body: Mutex<std::collections::VecDeque<Result<String>>>,
    }

    #[async_trait]
    impl Transport for StaticTransport {
        async fn fetch_text(&self, _url: &str) -> std::result::Result<String, reqwest::Error> {
            let mut q = self.body.lock().unwrap();
            match q.pop_front() {
                Some(Ok(s)) => Ok(s),
                _ => {
                    // reqwest::Error has no public constructor; simulate a
                    // network failure by hitting an invalid URL instead in
                    // tests that need a real error. Tests below avoid this path.
                    panic!("test misuse: no body queued")
                }
            }
        }
    }

    const SAMPLE: &str = r#"{"releases-index":[
        {"channel-version":"8.0","latest-sdk":"8.0.103","latest-runtime":"8.0.5","support-phase":"active","release-type":"lts"}
    ]}"#;

    #[tokio::test]
    async fn absent_cache_blocks_on_fresh_fetch() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(StaticTransport {
            body: Mutex::new([Ok(SAMPLE.to_string())].into()),
        });
        let cache = ReleaseIndexCache::new(
            IndexCacheConfig::default(),
            transport,
            dir.path().join("releases.json"),
        );
        let doc = cache.fetch().await.unwrap();
        assert_eq!(doc.releases_index.len(), 1);
        assert!(dir.path().join("releases.json").exists());
    }

    #[tokio::test]
    async fn fresh_cache_is_served_without_network() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("releases.json");
        std::fs::write(&cache_path, SAMPLE).unwrap();

        let transport = Arc::new(StaticTransport { body: Mutex::new([].into()) });
        let cache = ReleaseIndexCache::new(IndexCacheConfig::default(), transport, cache_path);
        // No queued body: if this reached the network it would panic.
        let doc = cache.fetch().await.unwrap();
        assert_eq!(doc.releases_index[0].channel_version, "8.0");
    }
}
