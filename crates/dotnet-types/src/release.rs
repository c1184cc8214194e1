use serde::{Deserialize, Serialize};

/// A channel's support phase, read bit-exactly from the release index per spec.md §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SupportPhase {
    Preview,
    GoLive,
    Active,
    Maintenance,
    Eol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Lts,
    Sts,
}

/// One entry of the remote release-index document (spec.md §3, §4.1).
///
/// Parsed with `#[serde(rename_all = "kebab-case")]` field names so the
/// struct's Rust-side names stay idiomatic while the wire format's
/// `channel-version`/`latest-sdk`/etc. are read bit-exactly (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseIndexEntry {
    pub channel_version: String,
    #[serde(default)]
    pub latest_runtime: Option<String>,
    #[serde(default)]
    pub latest_sdk: Option<String>,
    #[serde(default)]
    pub support_phase: Option<SupportPhase>,
    #[serde(default)]
    pub release_type: Option<ReleaseType>,
}

impl ReleaseIndexEntry {
    /// spec.md §4.1: reject entries missing `channel-version` or both `latest-*` fields.
    pub fn is_valid(&self) -> bool {
        !self.channel_version.trim().is_empty()
            && (self.latest_sdk.is_some() || self.latest_runtime.is_some())
    }

    pub fn latest_for(&self, mode: crate::mode::Mode) -> Option<&str> {
        match mode {
            crate::mode::Mode::Sdk => self.latest_sdk.as_deref(),
            crate::mode::Mode::Runtime | crate::mode::Mode::AspNetCore => {
                self.latest_runtime.as_deref()
            }
        }
    }
}

/// The top-level shape of the remote release-index document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseIndexDocument {
    #[serde(rename = "releases-index", default)]
    pub releases_index: Vec<ReleaseIndexEntry>,
}

impl ReleaseIndexDocument {
    /// Parse raw JSON, dropping entries that fail spec.md §4.1's validity check.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let mut doc: Self = serde_json::from_str(raw)?;
        doc.releases_index.retain(ReleaseIndexEntry::is_valid);
        Ok(doc)
    }
}

/// One SDK (or runtime) build listed in a channel's per-version releases file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkVersionEntry {
    pub version: String,
}

/// One dated release within a channel's releases file — carries the single
/// `sdk` that shipped with that release plus any additional `sdks` patch
/// builds also listed for it (the upstream format lists both).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelRelease {
    #[serde(default)]
    pub sdk: Option<SdkVersionEntry>,
    #[serde(default)]
    pub sdks: Option<Vec<SdkVersionEntry>>,
}

/// The per-channel releases document C2's `band` resolution needs (spec.md
/// §4.2 rule 4): the index alone only names each channel's `latest-sdk`, not
/// every patch build within a band.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelReleasesDocument {
    #[serde(default)]
    pub releases: Vec<ChannelRelease>,
}

impl ChannelReleasesDocument {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Every SDK version string this document lists, across all releases'
    /// `sdk` and `sdks` fields, duplicates included (the caller dedupes).
    pub fn all_sdk_versions(&self) -> Vec<&str> {
        self.releases
            .iter()
            .flat_map(|r| {
                r.sdk
                    .iter()
                    .map(|s| s.version.as_str())
                    .chain(r.sdks.iter().flatten().map(|s| s.version.as_str()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_entries_missing_latest_fields() {
        let raw = r#"{"releases-index":[
            {"channel-version":"8.0"},
            {"channel-version":"9.0","latest-sdk":"9.0.100","support-phase":"active","release-type":"sts"}
        ]}"#;
        let doc = ReleaseIndexDocument::parse(raw).unwrap();
        assert_eq!(doc.releases_index.len(), 1);
        assert_eq!(doc.releases_index[0].channel_version, "9.0");
    }
}
