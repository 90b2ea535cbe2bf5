//! Tool version parsing and probing
//!
//! Tool versions are compared as plain `(major, minor, patch)` triples:
//! - "3.28.1" → 3.28.1
//! - "3.28" → 3.28.0
//! - "14.0.0-1ubuntu1" → 14.0.0 (the mixed segment is dropped)
//!
//! Segments that are not entirely digits are discarded before padding, so
//! no input ever fails to parse. Probing an executable is the one place where
//! failures are swallowed: a tool that cannot report its version is simply
//! "unknown".

use std::fmt;
use std::str::FromStr;

use crate::exec::subprocess::CommandRunner;

/// A tool version (major.minor.patch), ordered lexicographically
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTriple {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl VersionTriple {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    /// Parse a dotted version string, dropping non-numeric segments
    pub fn parse(s: &str) -> Self {
        Self::from_segments(&numeric_segments(s))
    }

    fn from_segments(segments: &[u64]) -> Self {
        let part = |i: usize| segments.get(i).copied().unwrap_or(0);
        Self::new(part(0), part(1), part(2))
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for VersionTriple {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Parse a dotted version string into a triple
pub fn parse_version(s: &str) -> VersionTriple {
    VersionTriple::parse(s)
}

fn numeric_segments(s: &str) -> Vec<u64> {
    s.split('.')
        .filter(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()))
        // all digits, so the only failure is overflow
        .map(|seg| seg.parse::<u64>().unwrap_or(u64::MAX))
        .collect()
}

/// Extract the version from a `--version` banner line
///
/// Looks for a whitespace-separated token equal to "version" (any case) and
/// parses the token after it. Returns `None` when there is no such token or
/// the following token has no numeric segment at all.
pub fn version_from_banner(line: &str) -> Option<VersionTriple> {
    let mut tokens = line.split_whitespace();
    tokens.by_ref().find(|t| t.eq_ignore_ascii_case("version"))?;
    let candidate = tokens.next()?;

    let segments = numeric_segments(candidate);
    if segments.is_empty() {
        return None;
    }
    Some(VersionTriple::from_segments(&segments))
}

/// Run `executable --version` and parse the first line of its output
pub fn probe_version(runner: &dyn CommandRunner, executable: &str) -> Option<VersionTriple> {
    let result = match runner.output(executable, &["--version".to_string()]) {
        Ok(result) if result.success => result,
        Ok(result) => {
            tracing::debug!(executable, exit_code = result.exit_code, "version probe exited non-zero");
            return None;
        }
        Err(e) => {
            tracing::debug!(executable, error = %e, "version probe failed");
            return None;
        }
    };

    let first_line = result.stdout.lines().next()?;
    let version = version_from_banner(first_line);
    if version.is_none() {
        tracing::debug!(executable, banner = first_line, "no version token in banner");
    }
    version
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        assert_eq!(parse_version("3.28.1"), VersionTriple::new(3, 28, 1));
        assert_eq!(parse_version("3.28"), VersionTriple::new(3, 28, 0));
        assert_eq!(parse_version("17"), VersionTriple::new(17, 0, 0));
        assert_eq!(parse_version("1.2.3.4"), VersionTriple::new(1, 2, 3));
        assert_eq!(parse_version(""), VersionTriple::new(0, 0, 0));
    }

    #[test]
    fn test_version_parse_drops_mixed_segments() {
        // "1rc" fails the all-digits test and is removed before padding
        assert_eq!(parse_version("3.28.1rc"), VersionTriple::new(3, 28, 0));
        assert_eq!(parse_version("v3.28.1"), VersionTriple::new(28, 1, 0));
        assert_eq!(parse_version("14.0.0-1ubuntu1"), VersionTriple::new(14, 0, 0));
        assert_eq!(parse_version("a.b.c"), VersionTriple::new(0, 0, 0));
    }

    #[test]
    fn test_oversized_segment_keeps_its_position() {
        assert_eq!(
            parse_version("1.99999999999999999999999.3"),
            VersionTriple::new(1, u64::MAX, 3)
        );
        assert!(parse_version("3.99999999999999999999999") > parse_version("3.28.1"));
    }

    #[test]
    fn test_version_comparison() {
        let v1 = parse_version("3.20.0");
        let v2 = parse_version("3.28");
        let v3 = parse_version("4.0.0");
        assert!(v1 < v2);
        assert!(v2 < v3);
        assert!(parse_version("3.28.0") >= parse_version("3.28"));
        assert!(parse_version("10.0.0") > parse_version("9.99.99"));
    }

    #[test]
    fn test_display_and_from_str() {
        let v: VersionTriple = "3.28".parse().unwrap();
        assert_eq!(v.to_string(), "3.28.0");
    }

    #[test]
    fn test_version_from_banner() {
        assert_eq!(
            version_from_banner("cmake version 3.28.1"),
            Some(VersionTriple::new(3, 28, 1))
        );
        assert_eq!(
            version_from_banner("Ubuntu clang-format Version 14.0.0-1ubuntu1"),
            Some(VersionTriple::new(14, 0, 0))
        );
        assert_eq!(
            version_from_banner("Homebrew clang-format version 18.1.8"),
            Some(VersionTriple::new(18, 1, 8))
        );
    }

    #[test]
    fn test_version_from_banner_failures() {
        assert_eq!(version_from_banner("clang-format 18.1.8"), None);
        assert_eq!(version_from_banner("cmake version"), None);
        assert_eq!(version_from_banner("tool version unknown"), None);
        assert_eq!(version_from_banner(""), None);
    }
}
