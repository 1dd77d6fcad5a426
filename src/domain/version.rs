use crate::domain::prerelease::PreReleaseTag;
use crate::error::{GitSemverError, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// How strictly version strings are parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SemanticVersionFormat {
    /// Full SemVer 2.0: exactly three numeric components, no leading zeros
    #[default]
    Strict,
    /// Accepts `1`, `1.2`, a fourth numeric component, and leading zeros
    Loose,
}

/// The part of a version to bump, ordered by significance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VersionField {
    None,
    Patch,
    Minor,
    Major,
}

/// Build metadata attached to a calculated version
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildMetaData {
    /// Distance rendered after `+`; None when the canonical string omits it
    pub commits_since_tag: Option<u64>,
    pub commits_since_version_source: u64,
    pub sha: Option<String>,
    pub version_source_sha: Option<String>,
    pub branch: Option<String>,
    pub commit_date: Option<DateTime<Utc>>,
    pub uncommitted_changes: usize,
    /// Raw metadata carried over from a parsed tag (e.g. `build.5`)
    pub other: Option<String>,
}

/// Semantic version with pre-release tag and build metadata.
///
/// Equality and ordering ignore build metadata, as SemVer precedence does.
#[derive(Debug, Clone, Default)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Option<PreReleaseTag>,
    pub build_metadata: Option<BuildMetaData>,
}

fn loose_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"^(?P<major>\d+)(?:\.(?P<minor>\d+))?(?:\.(?P<patch>\d+))?(?:\.\d+)?(?:-(?P<pre>[0-9A-Za-z.-]+))?(?:\+(?P<build>[0-9A-Za-z.-]+))?$",
            )
            .ok()
        })
        .as_ref()
}

impl SemanticVersion {
    /// Create a release version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            pre_release: None,
            build_metadata: None,
        }
    }

    /// Attach a pre-release tag
    pub fn with_pre_release(mut self, label: impl Into<String>, number: Option<u64>) -> Self {
        self.pre_release = Some(PreReleaseTag::new(label, number));
        self
    }

    /// Parse a version string (without any tag prefix) under the given format
    pub fn parse(input: &str, format: SemanticVersionFormat) -> Result<Self> {
        match format {
            SemanticVersionFormat::Strict => Self::parse_strict(input),
            SemanticVersionFormat::Loose => Self::parse_loose(input),
        }
    }

    fn parse_strict(input: &str) -> Result<Self> {
        let parsed = semver::Version::parse(input).map_err(|e| {
            GitSemverError::version(format!("Invalid version '{}': {}", input, e))
        })?;

        let pre_release = if parsed.pre.is_empty() {
            None
        } else {
            Some(PreReleaseTag::parse(parsed.pre.as_str())?)
        };

        Ok(SemanticVersion {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            pre_release,
            build_metadata: raw_metadata(parsed.build.as_str()),
        })
    }

    fn parse_loose(input: &str) -> Result<Self> {
        let captures = loose_pattern()
            .and_then(|re| re.captures(input))
            .ok_or_else(|| {
                GitSemverError::version(format!("Invalid version format: '{}'", input))
            })?;

        let component = |name: &str| -> Result<u64> {
            match captures.name(name) {
                Some(m) => m.as_str().parse::<u64>().map_err(|_| {
                    GitSemverError::version(format!("Invalid {} version: {}", name, m.as_str()))
                }),
                None => Ok(0),
            }
        };

        let pre_release = match captures.name("pre") {
            Some(m) => Some(PreReleaseTag::parse(m.as_str())?),
            None => None,
        };

        Ok(SemanticVersion {
            major: component("major")?,
            minor: component("minor")?,
            patch: component("patch")?,
            pre_release,
            build_metadata: captures.name("build").and_then(|m| raw_metadata(m.as_str())),
        })
    }

    /// Bump the requested field, resetting lower fields and dropping the pre-release tag.
    ///
    /// Fails when the field is already `u64::MAX`.
    pub fn increment(&self, field: VersionField) -> Result<Self> {
        let bump = |value: u64| {
            value.checked_add(1).ok_or_else(|| {
                GitSemverError::version(format!(
                    "{} cannot be incremented: {:?} overflows",
                    self, field
                ))
            })
        };
        Ok(match field {
            VersionField::None => self.clone(),
            VersionField::Patch => SemanticVersion::new(self.major, self.minor, bump(self.patch)?),
            VersionField::Minor => SemanticVersion::new(self.major, bump(self.minor)?, 0),
            VersionField::Major => SemanticVersion::new(bump(self.major)?, 0, 0),
        })
    }

    /// Whether this version carries a pre-release tag
    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_some()
    }

    /// The pre-release label, empty for releases
    pub fn label(&self) -> &str {
        self.pre_release.as_ref().map_or("", |p| p.label.as_str())
    }

    /// Whether `major.minor.patch` matches another version
    pub fn same_core(&self, other: &SemanticVersion) -> bool {
        self.core() == other.core()
    }

    /// `(major, minor, patch)`
    pub fn core(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }

    /// This version with pre-release and metadata stripped
    pub fn core_version(&self) -> SemanticVersion {
        SemanticVersion::new(self.major, self.minor, self.patch)
    }

    /// `major.minor.patch`
    pub fn major_minor_patch(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }

    /// Render including `+commitsSinceTag` when present
    pub fn full_sem_ver(&self) -> String {
        match self
            .build_metadata
            .as_ref()
            .and_then(|meta| meta.commits_since_tag)
        {
            Some(commits) => format!("{}+{}", self, commits),
            None => self.to_string(),
        }
    }
}

fn raw_metadata(raw: &str) -> Option<BuildMetaData> {
    if raw.is_empty() {
        return None;
    }
    Some(BuildMetaData {
        other: Some(raw.to_string()),
        ..BuildMetaData::default()
    })
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.core()
            .cmp(&other.core())
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre_release {
            let rendered = pre.to_string();
            if !rendered.is_empty() {
                write!(f, "-{}", rendered)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse_strict() {
        let v = SemanticVersion::parse("1.2.3", SemanticVersionFormat::Strict).unwrap();
        assert_eq!(v, SemanticVersion::new(1, 2, 3));
    }

    #[test]
    fn test_version_parse_strict_prerelease_and_build() {
        let v = SemanticVersion::parse("4.0.0-beta.14+sha.5", SemanticVersionFormat::Strict)
            .unwrap();
        assert_eq!(v.pre_release, Some(PreReleaseTag::new("beta", Some(14))));
        assert_eq!(
            v.build_metadata.and_then(|m| m.other),
            Some("sha.5".to_string())
        );
    }

    #[test]
    fn test_version_parse_strict_rejects_short_forms() {
        assert!(SemanticVersion::parse("1.2", SemanticVersionFormat::Strict).is_err());
        assert!(SemanticVersion::parse("01.2.3", SemanticVersionFormat::Strict).is_err());
        assert!(SemanticVersion::parse("1.2.3.4", SemanticVersionFormat::Strict).is_err());
    }

    #[test]
    fn test_version_parse_loose() {
        let v = SemanticVersion::parse("1.2", SemanticVersionFormat::Loose).unwrap();
        assert_eq!(v, SemanticVersion::new(1, 2, 0));
        let v = SemanticVersion::parse("3", SemanticVersionFormat::Loose).unwrap();
        assert_eq!(v, SemanticVersion::new(3, 0, 0));
        let v = SemanticVersion::parse("1.2.3.4-rc.2", SemanticVersionFormat::Loose).unwrap();
        assert_eq!(v, SemanticVersion::new(1, 2, 3).with_pre_release("rc", Some(2)));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(SemanticVersion::parse("release", SemanticVersionFormat::Loose).is_err());
        assert!(SemanticVersion::parse("", SemanticVersionFormat::Strict).is_err());
    }

    #[test]
    fn test_increment_fields() {
        let v = SemanticVersion::new(1, 2, 3);
        assert_eq!(v.increment(VersionField::Major).unwrap(), SemanticVersion::new(2, 0, 0));
        assert_eq!(v.increment(VersionField::Minor).unwrap(), SemanticVersion::new(1, 3, 0));
        assert_eq!(v.increment(VersionField::Patch).unwrap(), SemanticVersion::new(1, 2, 4));
        assert_eq!(v.increment(VersionField::None).unwrap(), v);
    }

    #[test]
    fn test_increment_overflow_is_an_error() {
        let v = SemanticVersion::new(1, u64::MAX, u64::MAX);
        assert!(matches!(
            v.increment(VersionField::Patch),
            Err(GitSemverError::Version(_))
        ));
        assert!(v.increment(VersionField::Minor).is_err());
        assert_eq!(v.increment(VersionField::Major).unwrap(), SemanticVersion::new(2, 0, 0));
    }

    #[test]
    fn test_increment_drops_prerelease() {
        let v = SemanticVersion::new(1, 2, 3).with_pre_release("beta", Some(1));
        let bumped = v.increment(VersionField::Minor).unwrap();
        assert!(!bumped.is_pre_release());
    }

    #[test]
    fn test_ordering_follows_semver_precedence() {
        let release = SemanticVersion::new(1, 0, 0);
        let beta = SemanticVersion::new(1, 0, 0).with_pre_release("beta", Some(1));
        let older = SemanticVersion::new(0, 9, 9);
        assert!(release > beta);
        assert!(beta > older);
    }

    #[test]
    fn test_field_ordering() {
        assert!(VersionField::Major > VersionField::Minor);
        assert!(VersionField::Minor > VersionField::Patch);
        assert!(VersionField::Patch > VersionField::None);
    }

    #[test]
    fn test_display_and_full_sem_ver() {
        let mut v = SemanticVersion::new(1, 2, 1).with_pre_release("foo", Some(1));
        assert_eq!(v.to_string(), "1.2.1-foo.1");
        v.build_metadata = Some(BuildMetaData {
            commits_since_tag: Some(1),
            ..BuildMetaData::default()
        });
        assert_eq!(v.full_sem_ver(), "1.2.1-foo.1+1");
    }
}
