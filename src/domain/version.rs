use crate::error::{MonobumpError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Semantic version value.
///
/// Wraps a [`semver::Version`] together with the literal text it was parsed
/// from, so writing a version back keeps formatting such as a leading `v`.
/// Ordering and equality follow semver precedence: build metadata and the
/// original literal are ignored.
#[derive(Debug, Clone)]
pub struct Version {
    inner: semver::Version,
    original: String,
}

impl Version {
    /// Create a new release version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self::from_semver(semver::Version::new(major, minor, patch), "")
    }

    /// Parse a strict semantic version (`1.2.3`, `1.2.3-rc.1+build.5`).
    ///
    /// A leading `v` is rejected; see [`Version::parse_prefixed`].
    pub fn parse(text: &str) -> Result<Self> {
        let inner = semver::Version::parse(text).map_err(|e| MonobumpError::InvalidVersion {
            value: text.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Version {
            inner,
            original: text.to_string(),
        })
    }

    /// Parse a version that may carry a single leading `v` or `V`.
    ///
    /// The prefix is kept in [`Version::original`] and carried over by
    /// [`Version::bump`].
    pub fn parse_prefixed(text: &str) -> Result<Self> {
        let clean = text
            .strip_prefix('v')
            .or_else(|| text.strip_prefix('V'))
            .unwrap_or(text);

        let mut version = Self::parse(clean)?;
        version.original = text.to_string();
        Ok(version)
    }

    fn from_semver(inner: semver::Version, prefix: &str) -> Self {
        let original = format!("{}{}", prefix, inner);
        Version { inner, original }
    }

    pub fn major(&self) -> u64 {
        self.inner.major
    }

    pub fn minor(&self) -> u64 {
        self.inner.minor
    }

    pub fn patch(&self) -> u64 {
        self.inner.patch
    }

    /// Pre-release identifiers, empty for a release version
    pub fn pre_release(&self) -> &str {
        self.inner.pre.as_str()
    }

    /// Build metadata, empty when absent
    pub fn build(&self) -> &str {
        self.inner.build.as_str()
    }

    /// The exact text this version was constructed from
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Canonical `major.minor.patch[-pre][+build]` rendering without prefix
    pub fn canonical(&self) -> String {
        self.inner.to_string()
    }

    fn prefix(&self) -> &str {
        match self.original.chars().next() {
            Some(c @ ('v' | 'V')) => &self.original[..c.len_utf8()],
            _ => "",
        }
    }

    /// Same version, rendered with the leading `v` (or none) of `other`.
    pub fn with_prefix_of(&self, other: &Version) -> Self {
        Self::from_semver(self.inner.clone(), other.prefix())
    }

    /// Bump version according to bump type.
    ///
    /// Pre-release and build metadata are dropped. A patch bump of a
    /// pre-release only releases it (`1.2.3-rc.1` -> `1.2.3`). Incrementing a
    /// field already at `u64::MAX` is an `InvalidVersion` error.
    pub fn bump(&self, bump_type: VersionBump) -> Result<Self> {
        let v = &self.inner;
        let next = match bump_type {
            VersionBump::None => return Ok(self.clone()),
            VersionBump::Major => semver::Version::new(self.increment(v.major, "major")?, 0, 0),
            VersionBump::Minor => {
                semver::Version::new(v.major, self.increment(v.minor, "minor")?, 0)
            }
            VersionBump::Patch if !v.pre.is_empty() => {
                semver::Version::new(v.major, v.minor, v.patch)
            }
            VersionBump::Patch => {
                semver::Version::new(v.major, v.minor, self.increment(v.patch, "patch")?)
            }
        };
        Ok(Self::from_semver(next, self.prefix()))
    }

    fn increment(&self, field: u64, name: &str) -> Result<u64> {
        field
            .checked_add(1)
            .ok_or_else(|| MonobumpError::InvalidVersion {
                value: self.original.clone(),
                reason: format!("{} component cannot be incremented past {}", name, u64::MAX),
            })
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
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
        self.inner.cmp_precedence(&other.inner)
    }
}

impl FromStr for Version {
    type Err = MonobumpError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// Version bump category, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionBump {
    None,
    Patch,
    Minor,
    Major,
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionBump::None => "none",
            VersionBump::Patch => "patch",
            VersionBump::Minor => "minor",
            VersionBump::Major => "major",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v.major(), 1);
        assert_eq!(v.minor(), 2);
        assert_eq!(v.patch(), 3);
        assert_eq!(v.original(), "1.2.3");
    }

    #[test]
    fn test_version_parse_prerelease_and_build() {
        let v = Version::parse("1.0.0-rc.1+build.7").unwrap();
        assert_eq!(v.pre_release(), "rc.1");
        assert_eq!(v.build(), "build.7");
        assert_eq!(v.canonical(), "1.0.0-rc.1+build.7");
    }

    #[test]
    fn test_version_parse_rejects_prefix() {
        assert!(matches!(
            Version::parse("v1.2.3"),
            Err(MonobumpError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_version_parse_invalid() {
        for bad in ["1.2", "1.2.3.4", "", "01.2.3", "a.b.c", " 1.2.3"] {
            assert!(Version::parse(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_version_parse_prefixed_keeps_original() {
        let v = Version::parse_prefixed("v1.2.3").unwrap();
        assert_eq!(v, Version::new(1, 2, 3));
        assert_eq!(v.original(), "v1.2.3");
        assert_eq!(v.to_string(), "1.2.3");
    }

    #[test]
    fn test_canonical_round_trip() {
        for text in ["0.0.1", "1.2.3", "10.20.30-alpha.1", "1.0.0-beta+exp.sha.5114f85"] {
            let v = Version::parse(text).unwrap();
            let again = Version::parse(&v.canonical()).unwrap();
            assert_eq!(v, again);
            assert_eq!(again.canonical(), text);
        }
    }

    #[test]
    fn test_ordering_follows_precedence() {
        let a = Version::parse("1.0.0-alpha").unwrap();
        let b = Version::parse("1.0.0-alpha.1").unwrap();
        let c = Version::parse("1.0.0").unwrap();
        let d = Version::parse("1.0.1").unwrap();
        assert!(a < b);
        assert!(b < c);
        assert!(c < d);
        assert!(Version::parse("2.0.0").unwrap() > Version::parse("1.99.99").unwrap());
    }

    #[test]
    fn test_equality_ignores_build_and_original() {
        let a = Version::parse("1.2.3+one").unwrap();
        let b = Version::parse_prefixed("v1.2.3+two").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_version_bump_major() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(VersionBump::Major).unwrap(), Version::new(2, 0, 0));
    }

    #[test]
    fn test_version_bump_minor() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(VersionBump::Minor).unwrap(), Version::new(1, 3, 0));
    }

    #[test]
    fn test_version_bump_patch() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(VersionBump::Patch).unwrap(), Version::new(1, 2, 4));
    }

    #[test]
    fn test_version_bump_none_is_identity() {
        let v = Version::parse_prefixed("v1.2.3").unwrap();
        let same = v.bump(VersionBump::None).unwrap();
        assert_eq!(same, v);
        assert_eq!(same.original(), "v1.2.3");
    }

    #[test]
    fn test_version_bump_patch_releases_prerelease() {
        let v = Version::parse("1.2.3-rc.1").unwrap();
        assert_eq!(v.bump(VersionBump::Patch).unwrap().original(), "1.2.3");
    }

    #[test]
    fn test_version_bump_keeps_prefix_drops_metadata() {
        let v = Version::parse_prefixed("v1.2.3+build.9").unwrap();
        let bumped = v.bump(VersionBump::Minor).unwrap();
        assert_eq!(bumped.original(), "v1.3.0");
        assert_eq!(bumped.build(), "");
    }

    #[test]
    fn test_version_bump_overflow_is_error() {
        let max = u64::MAX;
        let cases = [
            (format!("{max}.0.0"), VersionBump::Major, "major"),
            (format!("1.{max}.0"), VersionBump::Minor, "minor"),
            (format!("1.2.{max}"), VersionBump::Patch, "patch"),
        ];
        for (text, bump, field) in cases {
            let v = Version::parse(&text).unwrap();
            match v.bump(bump) {
                Err(MonobumpError::InvalidVersion { value, reason }) => {
                    assert_eq!(value, text);
                    assert!(reason.contains(field), "unexpected reason: {reason}");
                }
                other => panic!("{text} {bump}: expected overflow error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_version_bump_below_max_fields_succeeds() {
        let max = u64::MAX;
        // lower fields at max are reset, not incremented
        let v = Version::parse(&format!("1.{max}.{max}")).unwrap();
        assert_eq!(v.bump(VersionBump::Major).unwrap(), Version::new(2, 0, 0));
        let rc = Version::parse(&format!("1.2.{max}-rc.1")).unwrap();
        assert_eq!(rc.bump(VersionBump::Patch).unwrap(), Version::new(1, 2, max));
    }

    #[test]
    fn test_with_prefix_of() {
        let tagged = Version::parse("1.4.0").unwrap();
        let on_disk = Version::parse_prefixed("v1.3.9").unwrap();
        assert_eq!(tagged.with_prefix_of(&on_disk).original(), "v1.4.0");
        assert_eq!(on_disk.with_prefix_of(&tagged).original(), "1.3.9");
    }

    #[test]
    fn test_bump_severity_order() {
        assert!(VersionBump::Major > VersionBump::Minor);
        assert!(VersionBump::Minor > VersionBump::Patch);
        assert!(VersionBump::Patch > VersionBump::None);
    }
}
