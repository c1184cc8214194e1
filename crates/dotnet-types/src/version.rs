//! Version spec classification and a fully specified `major.minor.patch[-preview]`.
//!
//! `VersionSpec` is the loose, user-facing shape (spec.md §3); `FullVersion`
//! is what `dotnet-resolver` produces and everything downstream consumes.

use std::fmt;

/// A user-facing version spec, classified into one of the four shapes spec.md
/// §3 names. Classification happens at parse time so later stages never need
/// to re-sniff a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// `"8"`
    Major(u32),
    /// `"8.0"`
    MajorMinor(u32, u32),
    /// `"8.0.1xx"`
    Band { major: u32, minor: u32, band: u32 },
    /// `"8.0.103"`, optionally a preview build.
    Full(FullVersion),
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Major(m) => write!(f, "{m}"),
            VersionSpec::MajorMinor(m, n) => write!(f, "{m}.{n}"),
            VersionSpec::Band { major, minor, band } => write!(f, "{major}.{minor}.{band}xx"),
            VersionSpec::Full(v) => write!(f, "{v}"),
        }
    }
}

/// A fully specified version: `major.minor.patch`, with an optional preview tag.
///
/// For SDK versions the patch component's hundreds digit is the band
/// (`8.0.103` → band 1, patch-within-band 3); runtime versions don't carry a
/// band and `band()` returns `None` for them, distinguished by the caller's
/// `Mode` rather than by this type (a `FullVersion` on its own can't tell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FullVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub preview: Option<u32>,
}

impl FullVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch, preview: None }
    }

    pub fn with_preview(mut self, preview: u32) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn is_preview(&self) -> bool {
        self.preview.is_some()
    }

    /// SDK band (hundreds digit of `patch`), e.g. `103` → `1`.
    pub fn sdk_band(&self) -> u32 {
        self.patch / 100
    }

    /// SDK patch-within-band (last two digits of `patch`), e.g. `103` → `3`.
    pub fn sdk_patch_in_band(&self) -> u32 {
        self.patch % 100
    }
}

impl fmt::Display for FullVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(p) = self.preview {
            write!(f, "-preview.{p}")?;
        }
        Ok(())
    }
}

impl PartialOrd for FullVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FullVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

/// How strictly a caller's version spec binds to an available version.
/// `latest_major` and `disable` are normalized away per spec.md §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum VersionSpecRequirement {
    Equal,
    GreaterThanOrEqual,
    LessThanOrEqual,
    LatestPatch,
    LatestFeature,
}

impl VersionSpecRequirement {
    /// Apply spec.md §3's normalization: `latest_major` → `greater_than_or_equal`,
    /// `disable` → `equal`.
    pub fn normalize(raw: RawVersionSpecRequirement) -> Self {
        match raw {
            RawVersionSpecRequirement::Equal | RawVersionSpecRequirement::Disable => Self::Equal,
            RawVersionSpecRequirement::GreaterThanOrEqual
            | RawVersionSpecRequirement::LatestMajor => Self::GreaterThanOrEqual,
            RawVersionSpecRequirement::LessThanOrEqual => Self::LessThanOrEqual,
            RawVersionSpecRequirement::LatestPatch => Self::LatestPatch,
            RawVersionSpecRequirement::LatestFeature => Self::LatestFeature,
        }
    }
}

/// The seven-member tag set from spec.md §3 before normalization collapses it to five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RawVersionSpecRequirement {
    Equal,
    GreaterThanOrEqual,
    LessThanOrEqual,
    LatestPatch,
    LatestFeature,
    LatestMajor,
    Disable,
}

/// Whether a resolution/validation may accept a preview build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum PreviewPolicy {
    #[default]
    RejectPreviews,
    AllowPreviews,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdk_band_decomposition() {
        let v = FullVersion::new(8, 0, 103);
        assert_eq!(v.sdk_band(), 1);
        assert_eq!(v.sdk_patch_in_band(), 3);
    }

    #[test]
    fn ordering_is_major_minor_patch() {
        assert!(FullVersion::new(8, 0, 100) < FullVersion::new(8, 0, 200));
        assert!(FullVersion::new(7, 9, 999) < FullVersion::new(8, 0, 0));
    }

    #[test]
    fn normalize_collapses_latest_major_and_disable() {
        assert_eq!(
            VersionSpecRequirement::normalize(RawVersionSpecRequirement::LatestMajor),
            VersionSpecRequirement::GreaterThanOrEqual
        );
        assert_eq!(
            VersionSpecRequirement::normalize(RawVersionSpecRequirement::Disable),
            VersionSpecRequirement::Equal
        );
    }
}
