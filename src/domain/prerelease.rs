//! Pre-release tag handling for semantic versioning
//!
//! A pre-release tag is a label plus an optional sequence number, e.g. `beta.14`.
//! According to semver.org: https://semver.org/#spec-item-9

use crate::error::{GitSemverError, Result};
use std::cmp::Ordering;
use std::fmt;

/// Pre-release label with optional sequence number
///
/// # Examples
/// - "alpha" -> PreReleaseTag { label: "alpha", number: None }
/// - "beta.1" -> PreReleaseTag { label: "beta", number: Some(1) }
/// - "7" -> PreReleaseTag { label: "", number: Some(7) }
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PreReleaseTag {
    /// The label, possibly empty
    pub label: String,
    /// Optional sequence number
    pub number: Option<u64>,
}

impl PreReleaseTag {
    /// Create a new pre-release tag
    pub fn new(label: impl Into<String>, number: Option<u64>) -> Self {
        PreReleaseTag {
            label: label.into(),
            number,
        }
    }

    /// Parse a pre-release tag from the part of a version after `-`
    ///
    /// The trailing dot-separated identifier becomes the number when it is numeric;
    /// everything before it is the label.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(GitSemverError::version("Empty pre-release identifier"));
        }

        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        {
            return Err(GitSemverError::version(format!(
                "Invalid pre-release identifier: '{}'",
                s
            )));
        }

        let (label, number) = match s.rsplit_once('.') {
            Some((label, last)) if is_numeric(last) => (label, Some(parse_number(last)?)),
            _ if is_numeric(s) => ("", Some(parse_number(s)?)),
            _ => (s, None),
        };

        Ok(PreReleaseTag::new(label, number))
    }

    /// Case-insensitive label comparison
    pub fn matches_label(&self, label: &str) -> bool {
        self.label.eq_ignore_ascii_case(label)
    }
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn parse_number(s: &str) -> Result<u64> {
    s.parse::<u64>()
        .map_err(|_| GitSemverError::version(format!("Invalid pre-release number: '{}'", s)))
}

impl Ord for PreReleaseTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label
            .to_ascii_lowercase()
            .cmp(&other.label.to_ascii_lowercase())
            .then_with(|| self.number.cmp(&other.number))
    }
}

impl PartialOrd for PreReleaseTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PreReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.label.is_empty(), self.number) {
            (true, Some(n)) => write!(f, "{}", n),
            (true, None) => Ok(()),
            (false, Some(n)) => write!(f, "{}.{}", self.label, n),
            (false, None) => write!(f, "{}", self.label),
        }
    }
}
