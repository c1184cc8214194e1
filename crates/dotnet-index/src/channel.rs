//! Per-channel releases file fetch, needed by C2's `band` resolution (spec.md
//! §4.2 rule 4): the top-level index only names each channel's `latest-sdk`,
//! not every patch build within a band, so resolving `8.0.1xx` requires a
//! second document. This reuses C1's transport/storage primitives under the
//! same fetch-fresh-or-fall-back-to-cache policy, without the "first call in
//! process lifetime" special case that only applies to the main index.

use crate::storage;
use crate::transport::Transport;
use dotnet_types::{AcquireError, ChannelReleasesDocument, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct ChannelReleasesCacheConfig {
    /// `{channel}` is substituted with the channel's `major.minor` string.
    pub url_template: String,
    pub cache_ttl_ms: u64,
}

impl Default for ChannelReleasesCacheConfig {
    fn default() -> Self {
        Self {
            url_template:
                "https://raw.githubusercontent.com/dotnet/core/main/release-notes/{channel}/releases.json"
                    .to_string(),
            cache_ttl_ms: 4 * 60 * 60 * 1000,
        }
    }
}

pub struct ChannelReleasesCache {
    config: ChannelReleasesCacheConfig,
    transport: Arc<dyn Transport>,
    cache_dir: PathBuf,
}

impl ChannelReleasesCache {
    pub fn new(
        config: ChannelReleasesCacheConfig,
        transport: Arc<dyn Transport>,
        cache_dir: PathBuf,
    ) -> Self {
        Self { config, transport, cache_dir }
    }

    pub async fn fetch(&self, channel: &str) -> Result<ChannelReleasesDocument> {
        let url = self.config.url_template.replace("{channel}", channel);
        let cache_path = self.cache_dir.join(format!("{channel}.releases.json"));
        let ttl = Duration::from_millis(self.config.cache_ttl_ms);

        if let Some(age) = storage::age(&cache_path) {
            if age < ttl {
                return Self::load(&cache_path);
            }
        }

        match self.transport.fetch_text(&url).await {
            Ok(raw) => {
                let doc = ChannelReleasesDocument::parse(&raw)?;
                storage::atomic_write_bytes(&cache_path, raw.as_bytes())?;
                Ok(doc)
            }
            Err(network_err) => {
                if cache_path.exists() {
                    warn!(%channel, error = %network_err, "channel releases fetch failed, serving stale cache");
                    Self::load(&cache_path)
                } else {
                    Err(AcquireError::ReleaseIndexUnavailable { reason: network_err.to_string() })
                }
            }
        }
    }

    fn load(path: &std::path::Path) -> Result<ChannelReleasesDocument> {
        let raw = std::fs::read_to_string(path)?;
        ChannelReleasesDocument::parse(&raw).map_err(AcquireError::from)
    }
}
