use crate::domain::version::VersionField;
use crate::error::Result;
use chrono::{DateTime, Utc};
use git2::Oid;
use regex::Regex;
use std::sync::OnceLock;

/// A commit as read from the graph accessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: Oid,
    /// Parent ids, first parent first
    pub parents: Vec<Oid>,
    pub message: String,
    /// Seconds since the Unix epoch
    pub author_time: i64,
    /// Seconds since the Unix epoch
    pub commit_time: i64,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn first_parent(&self) -> Option<Oid> {
        self.parents.first().copied()
    }

    /// First line of the message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn commit_date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.commit_time, 0)
    }
}

/// Parsed representation of a conventional commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
    pub r#type: String,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking_change: bool,
}

fn conventional_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^([a-z]+)(?:\(([^)]+)\))?(!?):\s*(.*)").ok())
        .as_ref()
}

impl ConventionalCommit {
    /// Parse a commit message according to the conventional commits spec
    ///
    /// Supports `type(scope)!: description` with optional scope and `!`.
    /// Returns None for non-conventional messages.
    pub fn parse(message: &str) -> Option<Self> {
        let captures = conventional_pattern()?.captures(message)?;

        let r#type = captures.get(1)?.as_str().to_string();
        let scope = captures.get(2).map(|m| m.as_str().to_string());
        let has_exclamation = captures.get(3).map(|m| m.as_str()) == Some("!");
        let description = captures
            .get(4)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let is_breaking_change = has_exclamation
            || message.contains("BREAKING CHANGE:")
            || message.contains("BREAKING-CHANGE:");

        Some(ConventionalCommit {
            r#type,
            scope,
            description,
            is_breaking_change,
        })
    }

    /// The bump this commit implies, if any
    pub fn increment(&self) -> Option<VersionField> {
        if self.is_breaking_change {
            return Some(VersionField::Major);
        }
        match self.r#type.as_str() {
            "feat" | "feature" => Some(VersionField::Minor),
            "fix" | "perf" => Some(VersionField::Patch),
            _ => None,
        }
    }
}

/// Compiled `+semver:` bump markers
#[derive(Debug, Clone)]
pub struct BumpMarkers {
    major: Regex,
    minor: Regex,
    patch: Regex,
    none: Regex,
    conventional_commits: bool,
}

impl BumpMarkers {
    /// Compile marker patterns; any invalid pattern is a configuration error
    pub fn new(
        major: &str,
        minor: &str,
        patch: &str,
        none: &str,
        conventional_commits: bool,
    ) -> Result<Self> {
        Ok(BumpMarkers {
            major: Regex::new(major)?,
            minor: Regex::new(minor)?,
            patch: Regex::new(patch)?,
            none: Regex::new(none)?,
            conventional_commits,
        })
    }

    /// The highest-priority marker in a single message
    pub fn find(&self, message: &str) -> Option<VersionField> {
        let explicit = if self.major.is_match(message) {
            Some(VersionField::Major)
        } else if self.minor.is_match(message) {
            Some(VersionField::Minor)
        } else if self.patch.is_match(message) {
            Some(VersionField::Patch)
        } else if self.none.is_match(message) {
            Some(VersionField::None)
        } else {
            None
        };

        if !self.conventional_commits {
            return explicit;
        }

        let conventional = ConventionalCommit::parse(message).and_then(|c| c.increment());
        match (explicit, conventional) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    /// The highest-priority marker across many messages (major > minor > patch > none)
    pub fn find_highest<'a>(
        &self,
        messages: impl IntoIterator<Item = &'a str>,
    ) -> Option<VersionField> {
        messages.into_iter().filter_map(|m| self.find(m)).max()
    }
}
