//! The version comparison lattice from spec.md §4.5: decomposes both the
//! required and the available version into `(major, minor, band?, patch)`
//! and compares them according to the caller's `VersionSpecRequirement`.

use dotnet_types::{FullVersion, Mode, VersionSpec, VersionSpecRequirement};

/// What the requirement pins down — absent fields are wildcards, present
/// ones must be honored by the rule being applied.
#[derive(Debug, Clone, Copy)]
pub struct RequiredComponents {
    pub major: u32,
    pub minor: Option<u32>,
    pub band: Option<u32>,
    /// The raw (not patch-within-band) patch number, when fully specified.
    pub patch: Option<u32>,
}

impl RequiredComponents {
    pub fn from_spec(spec: &VersionSpec, mode: Mode) -> Self {
        match spec {
            VersionSpec::Major(major) => Self { major: *major, minor: None, band: None, patch: None },
            VersionSpec::MajorMinor(major, minor) => {
                Self { major: *major, minor: Some(*minor), band: None, patch: None }
            }
            VersionSpec::Band { major, minor, band } => {
                Self { major: *major, minor: Some(*minor), band: Some(*band), patch: None }
            }
            VersionSpec::Full(v) => Self {
                major: v.major,
                minor: Some(v.minor),
                band: mode.is_sdk().then(|| v.sdk_band()),
                patch: Some(v.patch),
            },
        }
    }

    /// A band, derived from an explicit band or (for SDK mode) from the patch's hundreds digit.
    fn effective_band(&self) -> Option<u32> {
        self.band.or_else(|| self.patch.map(|p| p / 100))
    }

    /// The lowest patch consistent with whatever was pinned (an explicit
    /// patch, or the floor of a band, or 0 if nothing was specified).
    fn patch_floor(&self) -> u32 {
        self.patch.unwrap_or_else(|| self.effective_band().map(|b| b * 100).unwrap_or(0))
    }
}

/// An installed version's decomposed components, for the same mode the
/// requirement targets.
#[derive(Debug, Clone, Copy)]
pub struct AvailableComponents {
    pub major: u32,
    pub minor: u32,
    pub band: Option<u32>,
    pub patch: u32,
}

impl AvailableComponents {
    pub fn from_full(v: &FullVersion, mode: Mode) -> Self {
        Self { major: v.major, minor: v.minor, band: mode.is_sdk().then(|| v.sdk_band()), patch: v.patch }
    }
}

impl RequiredComponents {
    /// Apply spec.md §4.5's lattice for the given requirement kind.
    pub fn matches(&self, available: &AvailableComponents, rule: VersionSpecRequirement) -> bool {
        match rule {
            VersionSpecRequirement::Equal => {
                self.major == available.major
                    && self.minor.map_or(true, |m| m == available.minor)
                    && self.band.map_or(true, |b| available.band == Some(b))
                    && self.patch.map_or(true, |p| p == available.patch)
            }
            VersionSpecRequirement::GreaterThanOrEqual => {
                let req_tuple =
                    (self.major, self.minor.unwrap_or(0), self.band.unwrap_or(0), self.patch.unwrap_or(0));
                let avail_tuple =
                    (available.major, available.minor, available.band.unwrap_or(0), available.patch);
                avail_tuple >= req_tuple
            }
            VersionSpecRequirement::LessThanOrEqual => {
                let req_tuple = (
                    self.major,
                    self.minor.unwrap_or(u32::MAX),
                    self.band.unwrap_or(u32::MAX),
                    self.patch.unwrap_or(u32::MAX),
                );
                let avail_tuple =
                    (available.major, available.minor, available.band.unwrap_or(0), available.patch);
                avail_tuple <= req_tuple
            }
            VersionSpecRequirement::LatestPatch => {
                let minor_ok = self.minor.map_or(true, |m| m == available.minor);
                let band_ok = match self.effective_band() {
                    Some(b) => available.band == Some(b),
                    None => true,
                };
                self.major == available.major && minor_ok && band_ok && available.patch >= self.patch_floor()
            }
            VersionSpecRequirement::LatestFeature => {
                let minor_ok = self.minor.map_or(true, |m| m == available.minor);
                self.major == available.major && minor_ok && available.patch >= self.patch_floor()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn full(major: u32, minor: u32, patch: u32) -> FullVersion {
        FullVersion::new(major, minor, patch)
    }

    #[test]
    fn equal_rejects_patch_mismatch() {
        let req = RequiredComponents::from_spec(&VersionSpec::Full(full(8, 0, 103)), Mode::Sdk);
        let avail = AvailableComponents::from_full(&full(8, 0, 104), Mode::Sdk);
        assert!(!req.matches(&avail, VersionSpecRequirement::Equal));
    }

    #[test]
    fn greater_than_or_equal_accepts_higher_patch() {
        let req = RequiredComponents::from_spec(&VersionSpec::Full(full(8, 0, 103)), Mode::Sdk);
        let avail = AvailableComponents::from_full(&full(8, 0, 110), Mode::Sdk);
        assert!(req.matches(&avail, VersionSpecRequirement::GreaterThanOrEqual));
    }

    #[rstest]
    #[case(103, 110, true)]
    #[case(103, 203, false)] // different band, latest_patch must stay within band
    #[case(103, 99, false)]
    fn latest_patch_stays_within_band(#[case] required_patch: u32, #[case] available_patch: u32, #[case] expected: bool) {
        let req = RequiredComponents::from_spec(&VersionSpec::Full(full(8, 0, required_patch)), Mode::Sdk);
        let avail = AvailableComponents::from_full(&full(8, 0, available_patch), Mode::Sdk);
        assert_eq!(req.matches(&avail, VersionSpecRequirement::LatestPatch), expected);
    }

    #[test]
    fn latest_feature_spans_bands() {
        let req = RequiredComponents::from_spec(&VersionSpec::Full(full(8, 0, 103)), Mode::Sdk);
        let avail = AvailableComponents::from_full(&full(8, 0, 203), Mode::Sdk);
        assert!(req.matches(&avail, VersionSpecRequirement::LatestFeature));
    }

    #[test]
    fn runtime_mode_has_no_band_concept() {
        let req = RequiredComponents::from_spec(&VersionSpec::Full(full(8, 0, 3)), Mode::Runtime);
        assert!(req.band.is_none());
        let avail = AvailableComponents::from_full(&full(8, 0, 5), Mode::Runtime);
        assert!(req.matches(&avail, VersionSpecRequirement::GreaterThanOrEqual));
    }
}
