//! Picks the single base version a calculation is built on

use crate::analyzer::context::CalculationContext;
use crate::analyzer::increment::{incremented_version, is_frozen};
use crate::analyzer::inheritance::resolve_increment;
use crate::analyzer::strategies::BaseVersionCandidate;
use crate::config::VersionStrategyKind;
use crate::domain::{SemanticVersion, VersionField};
use crate::error::Result;
use crate::git::Repository;
use crate::warnings::CalculationWarning;
use std::cmp::Ordering;
use tracing::debug;

/// The winning candidate and the version it proposes
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedCandidate {
    pub candidate: BaseVersionCandidate,
    pub incremented: SemanticVersion,
    /// An exact tag reported verbatim
    pub frozen: bool,
}

struct Ranked {
    candidate: BaseVersionCandidate,
    incremented: SemanticVersion,
    frozen: bool,
    on_target: bool,
    strategy_rank: usize,
}

impl Ranked {
    /// Best first
    fn compare(&self, other: &Ranked) -> Ordering {
        other
            .frozen
            .cmp(&self.frozen)
            .then_with(|| other.incremented.cmp(&self.incremented))
            .then_with(|| other.on_target.cmp(&self.on_target))
            .then_with(|| self.strategy_rank.cmp(&other.strategy_rank))
    }
}

fn strategy_rank(order: &[VersionStrategyKind], kind: VersionStrategyKind) -> usize {
    order.iter().position(|k| *k == kind).unwrap_or(order.len())
}

/// Rank candidates and return the winner.
///
/// An exact tag on the target that must not be incremented always wins.
/// Otherwise the highest incremented version wins; on equal versions a
/// candidate read from the target itself comes first, then the strategy
/// configured earliest. Equal top versions are reported as ambiguous.
///
/// Returns None for an empty candidate list.
pub fn select<R: Repository>(
    ctx: &CalculationContext<'_, R>,
    candidates: Vec<BaseVersionCandidate>,
) -> Result<Option<SelectedCandidate>> {
    let mut branch_field: Option<VersionField> = None;
    let mut ranked = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let frozen = is_frozen(&ctx.branch, &candidate);
        let field = if frozen || !candidate.should_increment {
            VersionField::None
        } else {
            match branch_field {
                Some(field) => field,
                None => {
                    let field = resolve_increment(ctx, &ctx.branch, ctx.target)?;
                    branch_field = Some(field);
                    field
                }
            }
        };
        let incremented = incremented_version(ctx, &candidate, field)?;
        debug!(
            strategy = ?candidate.strategy,
            base = %candidate.version,
            %incremented,
            source = ?candidate.source,
            "candidate: {}",
            candidate.description
        );

        ranked.push(Ranked {
            on_target: candidate.source == Some(ctx.target),
            strategy_rank: strategy_rank(&ctx.branch.strategies, candidate.strategy),
            candidate,
            incremented,
            frozen,
        });
    }

    ranked.sort_by(Ranked::compare);
    let Some(winner) = ranked.first() else {
        return Ok(None);
    };

    let tied: Vec<VersionStrategyKind> = ranked
        .iter()
        .filter(|r| r.frozen == winner.frozen && r.incremented == winner.incremented)
        .map(|r| r.candidate.strategy)
        .collect();
    if tied.len() > 1 {
        ctx.warn(CalculationWarning::AmbiguousVersion {
            version: winner.incremented.to_string(),
            strategies: tied,
        });
    }

    debug!(
        strategy = ?winner.candidate.strategy,
        version = %winner.incremented,
        "selected base version"
    );

    let winner = ranked.swap_remove(0);
    Ok(Some(SelectedCandidate {
        candidate: winner.candidate,
        incremented: winner.incremented,
        frozen: winner.frozen,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Configuration};
    use crate::git::MockRepository;
    use git2::Oid;

    fn configuration() -> Configuration {
        Configuration::build(&Config::default()).unwrap()
    }

    fn candidate(
        kind: VersionStrategyKind,
        version: SemanticVersion,
        source: Option<Oid>,
    ) -> BaseVersionCandidate {
        BaseVersionCandidate::new(kind, version, source, "test").without_increment()
    }

    #[test]
    fn test_highest_version_wins() {
        let mut repo = MockRepository::new();
        let a = repo.commit("a");
        let tip = repo.commit("b");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "main").unwrap();

        let selected = select(
            &ctx,
            vec![
                candidate(VersionStrategyKind::TaggedCommit, SemanticVersion::new(1, 0, 0), Some(a)),
                candidate(VersionStrategyKind::Fallback, SemanticVersion::new(2, 0, 0), None),
            ],
        )
        .unwrap()
        .unwrap();
        assert_eq!(selected.incremented, SemanticVersion::new(2, 0, 0));
        assert!(ctx.take_warnings().is_empty());
    }

    #[test]
    fn test_tie_prefers_source_on_target_then_strategy_order() {
        let mut repo = MockRepository::new();
        let a = repo.commit("a");
        let tip = repo.commit("b");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "main").unwrap();

        let selected = select(
            &ctx,
            vec![
                candidate(VersionStrategyKind::Fallback, SemanticVersion::new(1, 0, 0), Some(a)),
                candidate(VersionStrategyKind::TaggedCommit, SemanticVersion::new(1, 0, 0), Some(tip)),
            ],
        )
        .unwrap()
        .unwrap();
        assert_eq!(selected.candidate.strategy, VersionStrategyKind::TaggedCommit);

        let selected = select(
            &ctx,
            vec![
                candidate(VersionStrategyKind::TaggedCommit, SemanticVersion::new(1, 0, 0), Some(a)),
                candidate(VersionStrategyKind::Fallback, SemanticVersion::new(1, 0, 0), Some(a)),
            ],
        )
        .unwrap()
        .unwrap();
        // Fallback is listed before TaggedCommit in the GitFlow preset
        assert_eq!(selected.candidate.strategy, VersionStrategyKind::Fallback);

        let warnings = ctx.take_warnings();
        assert_eq!(warnings.len(), 2);
        assert!(matches!(warnings[0], CalculationWarning::AmbiguousVersion { .. }));
    }

    #[test]
    fn test_frozen_tag_outranks_higher_version() {
        let mut repo = MockRepository::new();
        let tip = repo.commit("a");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "main").unwrap();

        let mut exact = candidate(
            VersionStrategyKind::TaggedCommit,
            SemanticVersion::new(1, 2, 0),
            Some(tip),
        );
        exact.exact_tag = true;
        let selected = select(
            &ctx,
            vec![
                candidate(VersionStrategyKind::TrackReleaseBranches, SemanticVersion::new(2, 0, 0), None),
                exact,
            ],
        )
        .unwrap()
        .unwrap();
        assert!(selected.frozen);
        assert_eq!(selected.incremented, SemanticVersion::new(1, 2, 0));
    }

    #[test]
    fn test_empty_candidates() {
        let mut repo = MockRepository::new();
        let tip = repo.commit("a");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "main").unwrap();
        assert!(select(&ctx, Vec::new()).unwrap().is_none());
    }
}
