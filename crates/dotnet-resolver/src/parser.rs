//! Syntactic classification of a user-facing version spec string into one of
//! the four shapes spec.md §3 names, per §4.2 rule 1.

use dotnet_types::{AcquireError, FullVersion, VersionSpec};

/// Parse a loose version spec string (`"8"`, `"8.0"`, `"8.0.1xx"`,
/// `"8.0.103"`, `"8.0.103-preview.5"`) into its classified shape.
pub fn parse(spec: &str) -> Result<VersionSpec, AcquireError> {
    let trimmed = spec.trim();
    let invalid = |reason: &str| AcquireError::InvalidVersion {
        version: spec.to_string(),
        reason: reason.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid("version spec is empty"));
    }

    // The preview suffix carries its own dot (`-preview.5`), so peel it off
    // before splitting the version proper into dot-separated components.
    let (core, preview) = split_preview(trimmed);

    let parts: Vec<&str> = core.split('.').collect();
    match parts.as_slice() {
        [major] => {
            if preview.is_some() {
                return Err(invalid("preview suffix requires a full major.minor.patch version"));
            }
            let major = parse_component(major).ok_or_else(|| invalid("major must be an integer"))?;
            Ok(VersionSpec::Major(major))
        }
        [major, minor] => {
            if minor.is_empty() {
                return Err(invalid("missing minor component"));
            }
            if preview.is_some() {
                return Err(invalid("preview suffix requires a full major.minor.patch version"));
            }
            let major = parse_component(major).ok_or_else(|| invalid("major must be an integer"))?;
            let minor = parse_component(minor).ok_or_else(|| invalid("minor must be an integer"))?;
            Ok(VersionSpec::MajorMinor(major, minor))
        }
        [major, minor, third] => {
            let major = parse_component(major).ok_or_else(|| invalid("major must be an integer"))?;
            let minor = parse_component(minor).ok_or_else(|| invalid("minor must be an integer"))?;

            if let Some(band_digits) = strip_band_suffix(third) {
                if preview.is_some() {
                    return Err(invalid("band specs cannot carry a preview suffix"));
                }
                let band = parse_component(band_digits)
                    .ok_or_else(|| invalid("band must be digits followed by 'xx'"))?;
                return Ok(VersionSpec::Band { major, minor, band });
            }

            let patch = parse_component(third).ok_or_else(|| invalid("patch must be an integer"))?;
            let mut full = FullVersion::new(major, minor, patch);
            if let Some(preview) = preview {
                let preview = parse_component(preview)
                    .ok_or_else(|| invalid("preview number must be an integer"))?;
                full = full.with_preview(preview);
            }
            Ok(VersionSpec::Full(full))
        }
        _ => Err(invalid("expected 1-3 dot-separated components")),
    }
}

fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn strip_band_suffix(third: &str) -> Option<&str> {
    third.strip_suffix("xx").or_else(|| third.strip_suffix("XX"))
}

/// `"8.0.103-preview.5"` -> `("8.0.103", Some("5"))`; `"8.0.103"` -> `("8.0.103", None)`.
fn split_preview(spec: &str) -> (&str, Option<&str>) {
    match spec.split_once("-preview.") {
        Some((core, preview)) => (core, Some(preview)),
        None => (spec, None),
    }
}
