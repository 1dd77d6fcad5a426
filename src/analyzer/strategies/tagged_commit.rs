use crate::analyzer::context::CalculationContext;
use crate::analyzer::strategies::{BaseVersionCandidate, VersionStrategy};
use crate::config::VersionStrategyKind;
use crate::domain::tag::preferred_tag;
use crate::domain::Tag;
use crate::error::Result;
use crate::git::Repository;
use git2::Oid;
use std::collections::BTreeMap;

/// Versions from tags reachable from the target, one candidate per tagged commit.
///
/// The candidate for a tag on the target itself is marked exact whatever its
/// label; the label only decides between tags sharing a commit.
///
/// With `track_merge_target`, tags on merge commits the target has not reached
/// also count when the branch they merged is part of the target's history;
/// the merged-in parent becomes the source.
pub struct TaggedCommitStrategy;

fn candidate(tag: &Tag, source: Oid, exact: bool) -> Option<BaseVersionCandidate> {
    let version = tag.version.clone()?;
    let mut candidate = BaseVersionCandidate::new(
        VersionStrategyKind::TaggedCommit,
        version,
        Some(source),
        format!("tag '{}'", tag.name),
    );
    candidate.exact_tag = exact;
    Some(candidate)
}

impl<R: Repository> VersionStrategy<R> for TaggedCommitStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::TaggedCommit
    }

    fn candidates(&self, ctx: &CalculationContext<'_, R>) -> Result<Vec<BaseVersionCandidate>> {
        let label = ctx.branch.label();

        let mut by_commit: BTreeMap<Oid, Vec<&Tag>> = BTreeMap::new();
        for tag in ctx.reachable_tags(ctx.target)? {
            by_commit.entry(tag.target).or_default().push(tag);
        }

        let mut candidates = Vec::new();
        for (commit, tags) in &by_commit {
            if let Some(tag) = preferred_tag(tags, label) {
                candidates.extend(candidate(tag, *commit, *commit == ctx.target));
            }
        }

        if ctx.branch.track_merge_target {
            let mut merged: BTreeMap<(Oid, Oid), Vec<&Tag>> = BTreeMap::new();
            for tag in ctx.all_tags() {
                if by_commit.contains_key(&tag.target) {
                    continue;
                }
                let commit = ctx.repo().get_commit(tag.target)?;
                for parent in commit.parents.iter().skip(1) {
                    if ctx.graph.is_ancestor(*parent, ctx.target)? {
                        merged.entry((tag.target, *parent)).or_default().push(tag);
                    }
                }
            }
            for ((_, parent), tags) in &merged {
                if let Some(tag) = preferred_tag(tags, label) {
                    candidates.extend(candidate(tag, *parent, false));
                }
            }
        }

        Ok(candidates)
    }
}
