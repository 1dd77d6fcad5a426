//! Merge commit message parsing
//!
//! Recognizes the messages git, GitHub and Azure DevOps write for merges so
//! that the merged branch can be identified after it has been deleted.

use crate::domain::branch::normalize_branch_name;
use regex::Regex;
use std::sync::OnceLock;

/// Branch information recovered from a merge commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeMessage {
    /// The branch that was merged in
    pub merged_branch: String,
    /// The branch merged into, when the message names it
    pub target_branch: Option<String>,
    /// Pull request number for pull request merges
    pub pull_request: Option<u64>,
}

fn formats() -> &'static [Regex] {
    static FORMATS: OnceLock<Vec<Regex>> = OnceLock::new();
    FORMATS.get_or_init(|| {
        [
            r"^Merge branch '(?P<source>[^']+)'(?: into (?P<target>\S+))?",
            r"^Merge remote-tracking branch '(?P<source>[^']+)'(?: into (?P<target>\S+))?",
            r"^Merge pull request #(?P<pr>\d+) (?:from|in) (?:[^\s/]+/)?(?P<source>\S+)(?: into (?P<target>\S+))?",
            r"^Merged PR (?P<pr>\d+): Merged? (?P<source>\S+) (?:to|into) (?P<target>\S+)",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

impl MergeMessage {
    /// Parse the first line of a merge commit message
    pub fn parse(message: &str) -> Option<Self> {
        let summary = message.lines().next()?.trim();

        formats().iter().find_map(|format| {
            let captures = format.captures(summary)?;
            let merged_branch = normalize_branch_name(captures.name("source")?.as_str()).to_string();
            Some(MergeMessage {
                merged_branch,
                target_branch: captures
                    .name("target")
                    .map(|m| normalize_branch_name(m.as_str()).to_string()),
                pull_request: captures.name("pr").and_then(|m| m.as_str().parse().ok()),
            })
        })
    }
}
