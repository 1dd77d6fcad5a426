use crate::analyzer::context::CalculationContext;
use crate::analyzer::strategies::mainline::{replay_candidates, ReplayMode};
use crate::analyzer::strategies::{BaseVersionCandidate, VersionStrategy};
use crate::config::VersionStrategyKind;
use crate::error::Result;
use crate::git::Repository;

/// Like the mainline strategy, but every commit after the base tag is a bump
/// event, including those reached through merges. Merge commits themselves
/// only bump when their message carries a marker.
pub struct TrunkBasedStrategy;

impl<R: Repository> VersionStrategy<R> for TrunkBasedStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::TrunkBased
    }

    fn candidates(&self, ctx: &CalculationContext<'_, R>) -> Result<Vec<BaseVersionCandidate>> {
        replay_candidates(ctx, ReplayMode::AllCommits, VersionStrategyKind::TrunkBased)
    }
}
