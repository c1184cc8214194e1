//! Version Resolver (C2): classifies a loose version spec string and
//! resolves it to a fully specified version against the release index,
//! per spec.md §4.2.

mod parser;
mod resolve;

pub use parser::parse;
pub use resolve::resolve;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dotnet_index::{
        ChannelReleasesCache, ChannelReleasesCacheConfig, IndexCacheConfig, ReleaseIndexCache,
        Transport,
    };
    use dotnet_types::{AcquireError, FullVersion, Mode, PreviewPolicy};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    const INDEX: &str = r#"{"releases-index":[
        {"channel-version":"8.0","latest-sdk":"8.0.103","latest-runtime":"8.0.5","support-phase":"active","release-type":"lts"},
        {"channel-version":"9.0","latest-sdk":"9.0.100","latest-runtime":"9.0.0","support-phase":"preview","release-type":"sts"}
    ]}"#;

    const CHANNEL_8_0: &str = r#"{"releases":[
        {"sdk":{"version":"8.0.103"},"sdks":[{"version":"8.0.102"},{"version":"8.0.101"}]},
        {"sdk":{"version":"8.0.100"}}
    ]}"#;

    const CHANNEL_8_0_PREVIEW_IS_HIGHEST: &str = r#"{"releases":[
        {"sdk":{"version":"8.0.105-preview.1"}},
        {"sdk":{"version":"8.0.104"}}
    ]}"#;

    struct QueueTransport {
        bodies: Mutex<VecDeque<String>>,
    }

    #[async_trait]
    impl Transport for QueueTransport {
        async fn fetch_text(&self, _url: &str) -> Result<String, reqwest::Error> {
            Ok(self.bodies.lock().unwrap().pop_front().expect("test misuse: no body queued"))
        }
    }

    fn harness(bodies: Vec<&str>) -> (ReleaseIndexCache, ChannelReleasesCache, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let transport: Arc<dyn Transport> = Arc::new(QueueTransport {
            bodies: Mutex::new(bodies.into_iter().map(String::from).collect()),
        });
        let index = ReleaseIndexCache::new(
            IndexCacheConfig::default(),
            transport.clone(),
            dir.path().join("releases.json"),
        );
        let channels = ChannelReleasesCache::new(
            ChannelReleasesCacheConfig::default(),
            transport,
            dir.path().to_path_buf(),
        );
        (index, channels, dir)
    }

    #[tokio::test]
    async fn resolves_major_minor_to_latest_sdk() {
        let (index, channels, _dir) = harness(vec![INDEX]);
        let resolved =
            resolve::resolve(&index, &channels, "8.0", Mode::Sdk, PreviewPolicy::RejectPreviews)
                .await
                .unwrap();
        assert_eq!(resolved, FullVersion::new(8, 0, 103));
    }

    #[tokio::test]
    async fn resolves_major_to_highest_matching_channel() {
        let (index, channels, _dir) = harness(vec![INDEX]);
        let resolved = resolve::resolve(&index, &channels, "8", Mode::Sdk, PreviewPolicy::RejectPreviews)
            .await
            .unwrap();
        assert_eq!(resolved, FullVersion::new(8, 0, 103));
    }

    #[tokio::test]
    async fn resolves_runtime_mode_to_latest_runtime() {
        let (index, channels, _dir) = harness(vec![INDEX]);
        let resolved = resolve::resolve(
            &index,
            &channels,
            "8.0",
            Mode::Runtime,
            PreviewPolicy::RejectPreviews,
        )
        .await
        .unwrap();
        assert_eq!(resolved, FullVersion::new(8, 0, 5));
    }

    #[tokio::test]
    async fn resolves_band_to_highest_patch_within_band() {
        // Band resolution (rule 4) goes straight to the channel's per-version
        // releases file; it never touches the top-level index.
        let (index, channels, _dir) = harness(vec![CHANNEL_8_0]);
        let resolved =
            resolve::resolve(&index, &channels, "8.0.1xx", Mode::Sdk, PreviewPolicy::RejectPreviews)
                .await
                .unwrap();
        assert_eq!(resolved, FullVersion::new(8, 0, 103));
    }

    /// Rule 5: a preview candidate that outranks every stable patch in its
    /// band must not shadow the highest stable patch when the policy rejects
    /// previews — the filter has to run before `.max()`, not after.
    #[tokio::test]
    async fn band_resolution_skips_preview_when_policy_rejects_it() {
        let (index, channels, _dir) = harness(vec![CHANNEL_8_0_PREVIEW_IS_HIGHEST]);
        let resolved =
            resolve::resolve(&index, &channels, "8.0.1xx", Mode::Sdk, PreviewPolicy::RejectPreviews)
                .await
                .unwrap();
        assert_eq!(resolved, FullVersion::new(8, 0, 104));
    }

    /// The same band, with previews allowed, returns the preview build since
    /// it's the genuine highest patch in the band.
    #[tokio::test]
    async fn band_resolution_returns_preview_when_policy_allows_it() {
        let (index, channels, _dir) = harness(vec![CHANNEL_8_0_PREVIEW_IS_HIGHEST]);
        let resolved =
            resolve::resolve(&index, &channels, "8.0.1xx", Mode::Sdk, PreviewPolicy::AllowPreviews)
                .await
                .unwrap();
        assert_eq!(resolved, FullVersion::new(8, 0, 105).with_preview(1));
    }

    #[tokio::test]
    async fn empty_band_fails_with_version_resolution_failed() {
        let (index, channels, _dir) = harness(vec![CHANNEL_8_0]);
        let err =
            resolve::resolve(&index, &channels, "8.0.9xx", Mode::Sdk, PreviewPolicy::RejectPreviews)
                .await
                .unwrap_err();
        assert!(matches!(err, AcquireError::VersionResolutionFailed { .. }));
    }

    #[tokio::test]
    async fn unknown_channel_fails_with_version_resolution_failed() {
        let (index, channels, _dir) = harness(vec![INDEX]);
        let err =
            resolve::resolve(&index, &channels, "7.0", Mode::Sdk, PreviewPolicy::RejectPreviews)
                .await
                .unwrap_err();
        assert!(matches!(err, AcquireError::VersionResolutionFailed { .. }));
    }

    #[tokio::test]
    async fn malformed_spec_fails_with_invalid_version() {
        let (index, channels, _dir) = harness(vec![INDEX]);
        let err = resolve::resolve(&index, &channels, "foo", Mode::Sdk, PreviewPolicy::RejectPreviews)
            .await
            .unwrap_err();
        assert!(matches!(err, AcquireError::InvalidVersion { .. }));
    }

    #[tokio::test]
    async fn full_spec_is_returned_verbatim() {
        let (index, channels, _dir) = harness(vec![INDEX]);
        let resolved = resolve::resolve(
            &index,
            &channels,
            "8.0.103",
            Mode::Sdk,
            PreviewPolicy::RejectPreviews,
        )
        .await
        .unwrap();
        assert_eq!(resolved, FullVersion::new(8, 0, 103));
    }

    #[tokio::test]
    async fn preview_is_rejected_unless_policy_allows() {
        let (index, channels, _dir) = harness(vec![INDEX]);
        let err = resolve::resolve(
            &index,
            &channels,
            "9.0.100-preview.3",
            Mode::Sdk,
            PreviewPolicy::RejectPreviews,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AcquireError::VersionResolutionFailed { .. }));

        let (index, channels, _dir) = harness(vec![]);
        let resolved = resolve::resolve(
            &index,
            &channels,
            "9.0.100-preview.3",
            Mode::Sdk,
            PreviewPolicy::AllowPreviews,
        )
        .await
        .unwrap();
        assert_eq!(resolved, FullVersion::new(9, 0, 100).with_preview(3));
    }
}
