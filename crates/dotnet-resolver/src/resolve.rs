//! Resolve a parsed `VersionSpec` against the release index (C2, spec.md §4.2).

use crate::parser;
use dotnet_index::{ChannelReleasesCache, ReleaseIndexCache};
use dotnet_types::{
    AcquireError, FullVersion, Mode, PreviewPolicy, ReleaseIndexDocument, ReleaseIndexEntry,
    Result, VersionSpec,
};
use tracing::{debug, warn};

/// `resolve(spec, mode) -> fullVersion`, per spec.md §4.2.
///
/// Only fetches the release index (or a channel's releases file) when the
/// spec shape actually needs one — a `full` spec is returned verbatim with no
/// network dependency.
pub async fn resolve(
    index: &ReleaseIndexCache,
    channels: &ChannelReleasesCache,
    spec: &str,
    mode: Mode,
    preview_policy: PreviewPolicy,
) -> Result<FullVersion> {
    let shape = parser::parse(spec)?;

    let resolved = match &shape {
        VersionSpec::Major(major) => {
            let doc = index.fetch().await?;
            resolve_major(&doc, *major, mode)?
        }
        VersionSpec::MajorMinor(major, minor) => {
            let doc = index.fetch().await?;
            resolve_major_minor(&doc, *major, *minor, mode)?
        }
        VersionSpec::Band { major, minor, band } => {
            resolve_band(channels, *major, *minor, *band, preview_policy).await?
        }
        VersionSpec::Full(v) => *v,
    };

    if resolved.is_preview() && preview_policy == PreviewPolicy::RejectPreviews {
        return Err(AcquireError::VersionResolutionFailed {
            spec: spec.to_string(),
            reason: "resolved version is a preview build and preview policy rejects previews"
                .to_string(),
        });
    }

    debug!(%spec, resolved = %resolved, "version resolved");
    Ok(resolved)
}

fn channel_major(entry: &ReleaseIndexEntry) -> Option<u32> {
    entry.channel_version.split('.').next()?.parse().ok()
}

fn channel_minor(entry: &ReleaseIndexEntry) -> Option<u32> {
    entry.channel_version.split('.').nth(1)?.parse().ok()
}

/// Rule 2: normalize `major` to the highest `major.minor` channel whose first
/// component matches, then behave like a `major.minor` resolution against it.
fn resolve_major(doc: &ReleaseIndexDocument, major: u32, mode: Mode) -> Result<FullVersion> {
    let best = doc
        .releases_index
        .iter()
        .filter(|e| channel_major(e) == Some(major))
        .max_by_key(|e| channel_minor(e).unwrap_or(0))
        .ok_or_else(|| AcquireError::VersionResolutionFailed {
            spec: major.to_string(),
            reason: format!("no channel found for major version {major}"),
        })?;

    latest_for_entry(best, mode)
}

/// Rule 3: exact channel match, return its `latest-sdk`/`latest-runtime`.
fn resolve_major_minor(
    doc: &ReleaseIndexDocument,
    major: u32,
    minor: u32,
    mode: Mode,
) -> Result<FullVersion> {
    let entry = doc
        .releases_index
        .iter()
        .find(|e| channel_major(e) == Some(major) && channel_minor(e) == Some(minor))
        .ok_or_else(|| AcquireError::VersionResolutionFailed {
            spec: format!("{major}.{minor}"),
            reason: format!("no channel {major}.{minor} found in release index"),
        })?;

    latest_for_entry(entry, mode)
}

fn latest_for_entry(entry: &ReleaseIndexEntry, mode: Mode) -> Result<FullVersion> {
    let raw = entry.latest_for(mode).ok_or_else(|| AcquireError::VersionResolutionFailed {
        spec: entry.channel_version.clone(),
        reason: format!("channel {} has no {mode} build listed", entry.channel_version),
    })?;

    parse_full(raw)
}

/// Rule 4: restrict to the channel, fetch its per-version releases file, and
/// pick the highest patch within the band.
///
/// Rule 5: a preview-rejecting policy filters preview candidates out of the
/// band *before* picking the max — `FullVersion`'s `Ord` doesn't rank a
/// preview below the stable release it precedes, so filtering after the fact
/// would let a preview-only highest patch shadow a real stable one.
async fn resolve_band(
    channels: &ChannelReleasesCache,
    major: u32,
    minor: u32,
    band: u32,
    preview_policy: PreviewPolicy,
) -> Result<FullVersion> {
    let channel = format!("{major}.{minor}");
    let doc = channels.fetch(&channel).await?;

    let best = doc
        .all_sdk_versions()
        .into_iter()
        .filter_map(|raw| parse_full(raw).ok())
        .filter(|v| v.major == major && v.minor == minor && v.sdk_band() == band)
        .filter(|v| !(v.is_preview() && preview_policy == PreviewPolicy::RejectPreviews))
        .max();

    best.ok_or_else(|| {
        warn!(%channel, band, "no sdk builds found for band");
        AcquireError::VersionResolutionFailed {
            spec: format!("{major}.{minor}.{band}xx"),
            reason: format!("band {band} is empty for channel {channel}"),
        }
    })
}

/// Parse a bit-exact `major.minor.patch[-preview.N]` string from the wire
/// (not a loose user spec) into a `FullVersion`.
fn parse_full(raw: &str) -> Result<FullVersion> {
    match parser::parse(raw)? {
        VersionSpec::Full(v) => Ok(v),
        other => Err(AcquireError::VersionResolutionFailed {
            spec: raw.to_string(),
            reason: format!("expected a fully specified version, got {other}"),
        }),
    }
}
