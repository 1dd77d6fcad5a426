use crate::analyzer::context::CalculationContext;
use crate::analyzer::strategies::{BaseVersionCandidate, VersionStrategy};
use crate::config::VersionStrategyKind;
use crate::domain::branch::version_in_branch_name;
use crate::domain::{BranchGroup, MergeMessage, SemanticVersion};
use crate::error::Result;
use crate::git::Repository;

/// Release branch versions seen from tracking and main branches.
///
/// Tracking branches see live release branches from their merge base. Both
/// tracking and main branches see release branches merged into their history,
/// found by merge message so that deleted branches still count.
pub struct TrackReleaseBranchesStrategy;

impl TrackReleaseBranchesStrategy {
    fn release_version<R: Repository>(
        ctx: &CalculationContext<'_, R>,
        branch_name: &str,
    ) -> Option<SemanticVersion> {
        if ctx.resolver.resolve(branch_name).group != BranchGroup::Release {
            return None;
        }
        version_in_branch_name(branch_name, &ctx.config.tag_prefix, ctx.config.format)
    }
}

impl<R: Repository> VersionStrategy<R> for TrackReleaseBranchesStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::TrackReleaseBranches
    }

    fn candidates(&self, ctx: &CalculationContext<'_, R>) -> Result<Vec<BaseVersionCandidate>> {
        let branch = &ctx.branch;
        if !branch.tracks_release_branches && !branch.is_main_branch {
            return Ok(Vec::new());
        }

        let mut candidates = Vec::new();

        if branch.tracks_release_branches {
            for release in ctx.other_branches() {
                let Some(version) = Self::release_version(ctx, &release.name) else {
                    continue;
                };
                let Some(merge_base) = ctx.repo().merge_base(release.tip, ctx.target)? else {
                    continue;
                };
                candidates.push(BaseVersionCandidate::new(
                    VersionStrategyKind::TrackReleaseBranches,
                    version,
                    Some(merge_base),
                    format!("release branch '{}'", release.name),
                ));
            }
        }

        // merges behind the latest reachable tag are superseded by it
        let floor = ctx
            .reachable_tags(ctx.target)?
            .into_iter()
            .max_by(|a, b| a.version.cmp(&b.version))
            .map(|tag| tag.target);
        for commit in ctx.graph.commits_between(floor, ctx.target)? {
            if !commit.is_merge() {
                continue;
            }
            let Some(merge) = MergeMessage::parse(&commit.message) else {
                continue;
            };
            let Some(version) = Self::release_version(ctx, &merge.merged_branch) else {
                continue;
            };

            let mut candidate = BaseVersionCandidate::new(
                VersionStrategyKind::TrackReleaseBranches,
                version,
                Some(commit.id),
                format!("merged release branch '{}'", merge.merged_branch),
            );
            candidate.should_increment = !branch.prevent_increment_of_merged_branch;
            candidates.push(candidate);
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Configuration};
    use crate::git::MockRepository;

    fn configuration() -> Configuration {
        Configuration::build(&Config::default()).unwrap()
    }

    #[test]
    fn test_develop_sees_live_release_branch() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.branch("develop");
        let fork = repo.commit("d");
        repo.branch("release/1.3.0");
        repo.commit("r");
        repo.checkout("develop").unwrap();
        let tip = repo.commit("next feature");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "develop").unwrap();

        let candidates = TrackReleaseBranchesStrategy.candidates(&ctx).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].version, SemanticVersion::new(1, 3, 0));
        assert_eq!(candidates[0].source, Some(fork));
        assert!(candidates[0].should_increment);
    }

    #[test]
    fn test_main_sees_deleted_release_through_merge_message() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.branch("release/2.0.0");
        repo.commit("r");
        repo.checkout("main").unwrap();
        let merge = repo.merge("release/2.0.0").unwrap();
        repo.delete_branch("release/2.0.0");
        let tip = repo.commit("after");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "main").unwrap();

        let candidates = TrackReleaseBranchesStrategy.candidates(&ctx).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].version, SemanticVersion::new(2, 0, 0));
        assert_eq!(candidates[0].source, Some(merge));
        // main prevents incrementing merged branches
        assert!(!candidates[0].should_increment);
    }

    #[test]
    fn test_merges_behind_latest_tag_are_not_walked() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.branch("release/2.0.0");
        repo.commit("r");
        repo.checkout("main").unwrap();
        repo.merge("release/2.0.0").unwrap();
        repo.tag("2.0.0");
        repo.delete_branch("release/2.0.0");
        let tip = repo.commit("after");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "main").unwrap();

        assert!(TrackReleaseBranchesStrategy.candidates(&ctx).unwrap().is_empty());
        // four ancestors of the tip, then the one commit after the tag
        assert_eq!(ctx.graph.steps(), 5);
    }

    #[test]
    fn test_feature_branch_does_not_track() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.branch("release/1.0.0");
        repo.commit("r");
        repo.checkout("main").unwrap();
        repo.branch("feature/x");
        let tip = repo.commit("x");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "feature/x").unwrap();

        assert!(TrackReleaseBranchesStrategy.candidates(&ctx).unwrap().is_empty());
    }
}
