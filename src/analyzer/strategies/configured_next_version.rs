use crate::analyzer::context::CalculationContext;
use crate::analyzer::strategies::{BaseVersionCandidate, VersionStrategy};
use crate::config::VersionStrategyKind;
use crate::error::Result;
use crate::git::Repository;

/// The `next_version` from configuration, used as-is.
///
/// Height counts from the nearest reachable tag at or above the configured
/// version, or from the start of history.
pub struct ConfiguredNextVersionStrategy;

impl<R: Repository> VersionStrategy<R> for ConfiguredNextVersionStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::ConfiguredNextVersion
    }

    fn candidates(&self, ctx: &CalculationContext<'_, R>) -> Result<Vec<BaseVersionCandidate>> {
        let Some(next) = ctx.branch.next_version.clone() else {
            return Ok(Vec::new());
        };
        if ctx.target_is_tagged() {
            return Ok(Vec::new());
        }

        let mut source = None;
        let mut nearest = u64::MAX;
        for tag in ctx.reachable_tags(ctx.target)? {
            if tag.version.as_ref().is_some_and(|v| v.core_version() >= next) {
                let distance = ctx.graph.distance(Some(tag.target), ctx.target)?;
                if distance < nearest {
                    nearest = distance;
                    source = Some(tag.target);
                }
            }
        }

        Ok(vec![BaseVersionCandidate::new(
            VersionStrategyKind::ConfiguredNextVersion,
            next,
            source,
            "next_version in configuration",
        )
        .without_increment()])
    }
}
