//! Which part of a base version to bump, and the bumped version

use crate::analyzer::context::CalculationContext;
use crate::analyzer::strategies::BaseVersionCandidate;
use crate::config::{CommitMessageIncrementMode, EffectiveConfiguration};
use crate::domain::{BumpMarkers, Commit, SemanticVersion, VersionField};
use crate::error::Result;
use crate::git::Repository;
use tracing::warn;

/// Combine a branch increment with the strongest commit-message marker.
///
/// A marker above the branch increment raises it; a lone `none` marker
/// suppresses the bump entirely.
pub fn combine(branch: VersionField, marker: Option<VersionField>) -> VersionField {
    match marker {
        Some(VersionField::None) => VersionField::None,
        Some(marker) => branch.max(marker),
        None => branch,
    }
}

/// Strongest marker in the commits the mode allows scanning
pub fn markers_in(
    markers: &BumpMarkers,
    mode: CommitMessageIncrementMode,
    commits: &[Commit],
) -> Option<VersionField> {
    match mode {
        CommitMessageIncrementMode::Disabled => None,
        CommitMessageIncrementMode::Enabled => {
            markers.find_highest(commits.iter().map(|c| c.message.as_str()))
        }
        CommitMessageIncrementMode::MergeMessageOnly => markers.find_highest(
            commits
                .iter()
                .filter(|c| c.is_merge())
                .map(|c| c.message.as_str()),
        ),
    }
}

/// An exact tag that must be reported verbatim.
///
/// Only branches that prevent incrementing a tagged commit freeze; release
/// branches bump past the tag they were cut from.
pub fn is_frozen(branch: &EffectiveConfiguration, candidate: &BaseVersionCandidate) -> bool {
    candidate.exact_tag && branch.prevent_increment_when_current_commit_tagged
}

/// The version a candidate proposes once incremented.
///
/// `branch_field` is the target branch's resolved increment.
pub fn incremented_version<R: Repository>(
    ctx: &CalculationContext<'_, R>,
    candidate: &BaseVersionCandidate,
    branch_field: VersionField,
) -> Result<SemanticVersion> {
    if is_frozen(&ctx.branch, candidate) || !candidate.should_increment {
        return Ok(candidate.version.clone());
    }
    // A pre-release base already names the version being prepared
    if candidate.version.is_pre_release() {
        return Ok(candidate.version.clone());
    }

    let marker = match ctx.branch.commit_message_incrementing {
        CommitMessageIncrementMode::Disabled => None,
        mode => match ctx.graph.commits_between(candidate.source, ctx.target) {
            Ok(commits) => markers_in(&ctx.config.markers, mode, &commits),
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "cannot scan commit messages; using branch increment");
                None
            }
            Err(e) => return Err(e),
        },
    };

    candidate.version.increment(combine(branch_field, marker))
}
