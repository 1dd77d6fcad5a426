//! Base version strategies
//!
//! Each strategy inspects the commit graph from the target's point of view and
//! proposes zero or more base versions. Every enabled strategy runs; the
//! selector decides between their candidates.

mod configured_next_version;
mod fallback;
mod mainline;
mod tagged_commit;
mod track_release_branches;
mod trunk_based;
mod version_in_branch_name;

pub use configured_next_version::ConfiguredNextVersionStrategy;
pub use fallback::FallbackStrategy;
pub use mainline::MainlineStrategy;
pub use tagged_commit::TaggedCommitStrategy;
pub use track_release_branches::TrackReleaseBranchesStrategy;
pub use trunk_based::TrunkBasedStrategy;
pub use version_in_branch_name::VersionInBranchNameStrategy;

use crate::analyzer::context::CalculationContext;
use crate::config::VersionStrategyKind;
use crate::domain::SemanticVersion;
use crate::error::Result;
use crate::git::Repository;
use git2::Oid;

/// A proposed base version
#[derive(Debug, Clone, PartialEq)]
pub struct BaseVersionCandidate {
    pub version: SemanticVersion,
    /// Commit the version was read from; None means the start of history
    pub source: Option<Oid>,
    pub strategy: VersionStrategyKind,
    pub should_increment: bool,
    /// The version comes from a tag on the target whose label matches the branch
    pub exact_tag: bool,
    /// Distance computed by a replaying strategy, used instead of the graph height
    pub replay_distance: Option<u64>,
    /// Human readable origin, for logs
    pub description: String,
}

impl BaseVersionCandidate {
    pub fn new(
        strategy: VersionStrategyKind,
        version: SemanticVersion,
        source: Option<Oid>,
        description: impl Into<String>,
    ) -> Self {
        BaseVersionCandidate {
            version,
            source,
            strategy,
            should_increment: true,
            exact_tag: false,
            replay_distance: None,
            description: description.into(),
        }
    }

    pub fn without_increment(mut self) -> Self {
        self.should_increment = false;
        self
    }
}

/// One way of discovering base versions
pub trait VersionStrategy<R: Repository> {
    fn kind(&self) -> VersionStrategyKind;

    /// Candidates for the context's target; an empty list is a valid answer
    fn candidates(&self, ctx: &CalculationContext<'_, R>) -> Result<Vec<BaseVersionCandidate>>;
}

/// The implementation behind a configured strategy
pub fn strategy_for<R: Repository>(kind: VersionStrategyKind) -> Box<dyn VersionStrategy<R>> {
    match kind {
        VersionStrategyKind::Fallback => Box::new(FallbackStrategy),
        VersionStrategyKind::ConfiguredNextVersion => Box::new(ConfiguredNextVersionStrategy),
        VersionStrategyKind::Mainline => Box::new(MainlineStrategy),
        VersionStrategyKind::TaggedCommit => Box::new(TaggedCommitStrategy),
        VersionStrategyKind::TrackReleaseBranches => Box::new(TrackReleaseBranchesStrategy),
        VersionStrategyKind::TrunkBased => Box::new(TrunkBasedStrategy),
        VersionStrategyKind::VersionInBranchName => Box::new(VersionInBranchNameStrategy),
    }
}
