//! Artifact version identifiers.
//!
//! A [`Version`] is the parsed form of the token that names a remote catalog
//! prefix and a local installation directory. Tokens follow SemVer 2.0 with
//! two relaxations found in hand-published artifact buckets:
//!
//! - an optional leading `v` (`v1.2.0`)
//! - missing minor/patch components (`1.2` orders exactly like `1.2.0`)
//!
//! Ordering is numeric per component, never lexicographic on the whole token,
//! so `10.0.0 > 9.0.0`. Pre-release versions sort before their release
//! (`1.0.0-beta < 1.0.0`) per SemVer precedence. Build metadata is kept in the
//! token but ignored for precedence.
//!
//! Distinct tokens with equal precedence (`1.2` and `1.2.0`, or `1.0.0` and
//! `1.0.0+build.5`) are still distinct versions: they name different
//! directories. [`Version::compare`] reports them as equal, while `Eq` and
//! `Ord` break the tie on the token bytes so that sorting is total and the
//! "installed" and "previous" of a store are never the same directory.
//! Use [`Version::compare`] when asking whether one version is newer.
//!
//! The original token is preserved verbatim because it is the directory name
//! on disk and the path segment in the remote store.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors produced when a token is not a valid version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The token was empty (or only whitespace).
    #[error("version string is empty")]
    Empty,

    /// The token did not match the version grammar.
    #[error("invalid version '{token}': {reason}")]
    Invalid { token: String, reason: String },
}

/// A parsed, immutable artifact version.
#[derive(Debug, Clone)]
pub struct Version {
    token: String,
    parsed: semver::Version,
}

impl Version {
    /// Parse a version token.
    ///
    /// # Example
    ///
    /// ```
    /// use std::cmp::Ordering;
    /// use kraftload::version::Version;
    ///
    /// let v = Version::parse("1.2").unwrap();
    /// assert_eq!(v.as_str(), "1.2");
    /// assert_eq!(Version::compare(&v, &Version::parse("1.2.0").unwrap()), Ordering::Equal);
    /// assert!(Version::parse("1.x").is_err());
    /// ```
    pub fn parse(token: &str) -> Result<Self, ParseError> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Empty);
        }
        if trimmed.len() != token.len() {
            return Err(invalid(token, "surrounding whitespace"));
        }

        let body = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let normalized = normalize_core(token, body)?;
        let parsed =
            semver::Version::parse(&normalized).map_err(|e| invalid(token, &e.to_string()))?;

        Ok(Self {
            token: token.to_string(),
            parsed,
        })
    }

    /// Compare two versions by precedence alone.
    pub fn compare(a: &Version, b: &Version) -> Ordering {
        a.parsed.cmp_precedence(&b.parsed)
    }

    /// The original token, exactly as it appears on disk or in the catalog.
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Major component.
    pub fn major(&self) -> u64 {
        self.parsed.major
    }

    /// Minor component (0 when the token omitted it).
    pub fn minor(&self) -> u64 {
        self.parsed.minor
    }

    /// Patch component (0 when the token omitted it).
    pub fn patch(&self) -> u64 {
        self.parsed.patch
    }

    /// Whether this is a pre-release (`1.0.0-rc.1`).
    pub fn is_prerelease(&self) -> bool {
        !self.parsed.pre.is_empty()
    }
}

/// Expand `MAJOR[.MINOR[.PATCH]]` to three components, keeping any
/// pre-release/build suffix intact.
fn normalize_core(token: &str, body: &str) -> Result<String, ParseError> {
    let suffix_at = body.find(&['-', '+'][..]).unwrap_or(body.len());
    let (core, suffix) = body.split_at(suffix_at);

    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3 {
        return Err(invalid(token, "more than three numeric components"));
    }
    for part in &parts {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(token, "components must be non-negative integers"));
        }
    }

    let mut normalized = parts.join(".");
    for _ in parts.len()..3 {
        normalized.push_str(".0");
    }
    normalized.push_str(suffix);
    Ok(normalized)
}

fn invalid(token: &str, reason: &str) -> ParseError {
    ParseError::Invalid {
        token: token.to_string(),
        reason: reason.to_string(),
    }
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        Version::compare(self, other).then_with(|| self.token.cmp(&other.token))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.token)
    }
}

/// Parse every token that is a valid version, silently skipping the rest,
/// and return them in ascending order without duplicates.
pub fn parse_sorted<'a, I>(tokens: I) -> Vec<Version>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut versions: Vec<Version> = tokens
        .into_iter()
        .filter_map(|t| Version::parse(t).ok())
        .collect();
    versions.sort();
    versions.dedup();
    versions
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_full_version() {
        let version = v("1.2.3");
        assert_eq!(version.major(), 1);
        assert_eq!(version.minor(), 2);
        assert_eq!(version.patch(), 3);
        assert_eq!(version.as_str(), "1.2.3");
    }

    #[test]
    fn test_parse_short_forms() {
        assert_eq!(Version::compare(&v("2"), &v("2.0.0")), Ordering::Equal);
        assert_eq!(Version::compare(&v("2.1"), &v("2.1.0")), Ordering::Equal);
        assert_eq!(v("v2.1").as_str(), "v2.1");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(Version::parse(""), Err(ParseError::Empty));
        assert!(Version::parse("x").is_err());
        assert!(Version::parse("1.2.3.4").is_err());
        assert!(Version::parse("1..2").is_err());
        assert!(Version::parse("1.2.x").is_err());
        assert!(Version::parse(" 1.0.0").is_err());
        assert!(Version::parse("1.0.0.tar.gz").is_err());
        assert!(Version::parse(".staging-1.0.0-42").is_err());
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        assert!(v("10.0.0") > v("9.0.0"));
        assert!(v("1.10.0") > v("1.9.0"));
        assert_eq!(Version::compare(&v("2.0.0"), &v("1.9.9")), Ordering::Greater);
    }

    #[test]
    fn test_prerelease_sorts_before_release() {
        assert_eq!(
            Version::compare(&v("1.0.0-beta"), &v("1.0.0")),
            Ordering::Less
        );
        assert!(v("1.0.0-alpha") < v("1.0.0-beta"));
        assert!(v("1.0.0-rc.1").is_prerelease());
    }

    #[test]
    fn test_build_metadata_ignored_for_precedence() {
        assert_eq!(
            Version::compare(&v("1.0.0+build.5"), &v("1.0.0")),
            Ordering::Equal
        );
        assert_eq!(v("1.0.0+build.5").as_str(), "1.0.0+build.5");
    }

    #[test]
    fn test_display_and_serialize_keep_token() {
        let version = v("v3.1");
        assert_eq!(version.to_string(), "v3.1");
        assert_eq!(serde_json::to_string(&version).unwrap(), "\"v3.1\"");
    }

    #[test]
    fn test_parse_sorted_skips_and_dedupes() {
        let versions = parse_sorted(["2.0.0", "x", "1.0.0", "10.0.0", "2.0.0", "README"]);
        let tokens: Vec<&str> = versions.iter().map(|v| v.as_str()).collect();
        assert_eq!(tokens, vec!["1.0.0", "2.0.0", "10.0.0"]);
    }

    #[test]
    fn test_equal_precedence_tokens_stay_distinct() {
        assert_ne!(v("1.2"), v("1.2.0"));
        assert!(v("1.2") < v("1.2.0"));
        assert!(v("1.0.0") < v("1.0.0+build.5"));
        assert!(v("1.2.0") < v("1.2.1"));

        let versions = parse_sorted(["1.2.0", "1.2", "v1.2", "1.2"]);
        let tokens: Vec<&str> = versions.iter().map(|v| v.as_str()).collect();
        assert_eq!(tokens, vec!["1.2", "1.2.0", "v1.2"]);
    }

    fn version_strategy() -> impl Strategy<Value = Version> {
        (0u64..50, 0u64..50, 0u64..50).prop_map(|(a, b, c)| v(&format!("{}.{}.{}", a, b, c)))
    }

    proptest! {
        #[test]
        fn prop_compare_is_antisymmetric(a in version_strategy(), b in version_strategy()) {
            prop_assert_eq!(Version::compare(&a, &b), Version::compare(&b, &a).reverse());
        }

        #[test]
        fn prop_compare_is_transitive(
            a in version_strategy(),
            b in version_strategy(),
            c in version_strategy(),
        ) {
            if a <= b && b <= c {
                prop_assert!(a <= c);
            }
        }

        #[test]
        fn prop_compare_matches_numeric_tuple(
            a in (0u64..1000, 0u64..1000, 0u64..1000),
            b in (0u64..1000, 0u64..1000, 0u64..1000),
        ) {
            let va = v(&format!("{}.{}.{}", a.0, a.1, a.2));
            let vb = v(&format!("{}.{}.{}", b.0, b.1, b.2));
            prop_assert_eq!(Version::compare(&va, &vb), a.cmp(&b));
        }

        #[test]
        fn prop_equal_strings_compare_equal(a in version_strategy()) {
            let again = v(a.as_str());
            prop_assert_eq!(Version::compare(&a, &again), Ordering::Equal);
        }
    }
}
