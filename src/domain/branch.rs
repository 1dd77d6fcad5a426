use crate::domain::tag::TagPrefix;
use crate::domain::version::{SemanticVersion, SemanticVersionFormat};
use crate::error::{GitSemverError, Result};
use git2::Oid;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Policy bucket a branch belongs to.
///
/// Declaration order is the matching priority: a name matching several group
/// patterns lands in the earliest group.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum BranchGroup {
    Support,
    Hotfix,
    Release,
    Main,
    Develop,
    Feature,
    PullRequest,
    Unknown,
}

impl BranchGroup {
    /// All groups in priority order
    pub const ALL: [BranchGroup; 8] = [
        BranchGroup::Support,
        BranchGroup::Hotfix,
        BranchGroup::Release,
        BranchGroup::Main,
        BranchGroup::Develop,
        BranchGroup::Feature,
        BranchGroup::PullRequest,
        BranchGroup::Unknown,
    ];

    /// Configuration key of the group
    pub fn key(&self) -> &'static str {
        match self {
            BranchGroup::Support => "support",
            BranchGroup::Hotfix => "hotfix",
            BranchGroup::Release => "release",
            BranchGroup::Main => "main",
            BranchGroup::Develop => "develop",
            BranchGroup::Feature => "feature",
            BranchGroup::PullRequest => "pull-request",
            BranchGroup::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BranchGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for BranchGroup {
    type Err = GitSemverError;

    fn from_str(s: &str) -> Result<Self> {
        BranchGroup::ALL
            .iter()
            .copied()
            .find(|group| group.key() == s)
            .ok_or_else(|| GitSemverError::config(format!("Unknown branch group '{}'", s)))
    }
}

/// A branch and its tip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub tip: Oid,
}

impl Branch {
    pub fn new(name: impl Into<String>, tip: Oid) -> Self {
        Branch {
            name: name.into(),
            tip,
        }
    }
}

/// Strip `refs/heads/`, `refs/remotes/<remote>/` and `origin/` from a branch name.
///
/// Pull-request refs such as `refs/pull/5/merge` lose only `refs/`.
pub fn normalize_branch_name(name: &str) -> &str {
    if let Some(rest) = name.strip_prefix("refs/heads/") {
        return rest;
    }
    if let Some(rest) = name.strip_prefix("refs/") {
        if rest.starts_with("pull/") || rest.starts_with("pull-requests/") {
            return rest;
        }
    }
    if let Some(rest) = name.strip_prefix("refs/remotes/") {
        return rest.split_once('/').map_or(rest, |(_, branch)| branch);
    }
    name.strip_prefix("origin/").unwrap_or(name)
}

/// Replace every character that cannot appear in a pre-release identifier with `-`
pub fn escape_branch_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

/// Version embedded in a branch name such as `release/1.2.0` or `hotfix-2.1`.
///
/// Each `/` segment is tried whole and after its first `-`; the first segment
/// that parses wins. Only the core version is kept.
pub fn version_in_branch_name(
    name: &str,
    prefix: &TagPrefix,
    format: SemanticVersionFormat,
) -> Option<SemanticVersion> {
    let name = normalize_branch_name(name);
    let parse = |candidate: &str| {
        prefix
            .parse_version(candidate, format)
            .or_else(|| prefix.parse_version(candidate, SemanticVersionFormat::Loose))
    };

    name.split('/')
        .flat_map(|segment| {
            let tail = segment.split_once('-').map(|(_, rest)| rest);
            std::iter::once(segment).chain(tail)
        })
        .find_map(parse)
        .map(|v| v.core_version())
}
