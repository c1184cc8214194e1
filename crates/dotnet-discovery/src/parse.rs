//! Parsing `--list-sdks`/`--list-runtimes` output lines, per spec.md §4.3 rule 5.

use dotnet_types::Mode;
use std::path::PathBuf;

/// Split a `"<prefix> [<path>]"` line into its prefix and bracketed path.
fn split_bracketed(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let open = line.find('[')?;
    let close = line.rfind(']')?;
    if close < open {
        return None;
    }
    Some((line[..open].trim(), &line[open + 1..close]))
}

/// `"<version> [path]"`.
pub fn sdk_line(line: &str) -> Option<(String, PathBuf)> {
    let (version, path) = split_bracketed(line)?;
    if version.is_empty() {
        return None;
    }
    Some((version.to_string(), PathBuf::from(path)))
}

/// `"<family> <version> [path]"`, kept only if `family` matches `mode`'s
/// runtime family (`Microsoft.NETCore.App` / `Microsoft.AspNetCore.App`).
pub fn runtime_line(line: &str, mode: Mode) -> Option<(String, PathBuf)> {
    let wanted = mode.runtime_family()?;
    let (prefix, path) = split_bracketed(line)?;
    let mut tokens = prefix.split_whitespace();
    let family = tokens.next()?;
    let version = tokens.next()?;
    if tokens.next().is_some() || family != wanted {
        return None;
    }
    Some((version.to_string(), PathBuf::from(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sdk_line() {
        let (v, p) = sdk_line("8.0.103 [/usr/share/dotnet/sdk]").unwrap();
        assert_eq!(v, "8.0.103");
        assert_eq!(p, PathBuf::from("/usr/share/dotnet/sdk"));
    }

    #[test]
    fn parses_matching_runtime_family() {
        let (v, _) = runtime_line(
            "Microsoft.NETCore.App 8.0.5 [/usr/share/dotnet/shared/Microsoft.NETCore.App]",
            Mode::Runtime,
        )
        .unwrap();
        assert_eq!(v, "8.0.5");
    }

    #[test]
    fn ignores_other_families_for_runtime_listing() {
        assert!(runtime_line(
            "Microsoft.AspNetCore.App 8.0.5 [/usr/share/dotnet/shared/Microsoft.AspNetCore.App]",
            Mode::Runtime,
        )
        .is_none());
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(sdk_line("no brackets here").is_none());
        assert!(runtime_line("Microsoft.NETCore.App [missing-version]", Mode::Runtime).is_none());
    }
}
