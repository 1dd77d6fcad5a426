use crate::analyzer::context::CalculationContext;
use crate::analyzer::strategies::{BaseVersionCandidate, VersionStrategy};
use crate::config::VersionStrategyKind;
use crate::domain::SemanticVersion;
use crate::error::Result;
use crate::git::Repository;

/// 0.0.0 from the start of history, when no version tag is reachable
pub struct FallbackStrategy;

impl<R: Repository> VersionStrategy<R> for FallbackStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::Fallback
    }

    fn candidates(&self, ctx: &CalculationContext<'_, R>) -> Result<Vec<BaseVersionCandidate>> {
        if !ctx.reachable_tags(ctx.target)?.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![BaseVersionCandidate::new(
            VersionStrategyKind::Fallback,
            SemanticVersion::new(0, 0, 0),
            None,
            "fallback base version",
        )])
    }
}
