use crate::analyzer::context::CalculationContext;
use crate::analyzer::inheritance::parent_candidates;
use crate::analyzer::strategies::{BaseVersionCandidate, VersionStrategy};
use crate::config::VersionStrategyKind;
use crate::domain::branch::version_in_branch_name;
use crate::error::Result;
use crate::git::Repository;

/// Version embedded in a release or hotfix branch name, counted from the branch point
pub struct VersionInBranchNameStrategy;

impl<R: Repository> VersionStrategy<R> for VersionInBranchNameStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::VersionInBranchName
    }

    fn candidates(&self, ctx: &CalculationContext<'_, R>) -> Result<Vec<BaseVersionCandidate>> {
        if !ctx.branch.is_release_branch {
            return Ok(Vec::new());
        }
        let name = &ctx.branch.branch_name;
        let Some(version) = version_in_branch_name(name, &ctx.config.tag_prefix, ctx.config.format)
        else {
            return Ok(Vec::new());
        };

        let branch_point = parent_candidates(ctx, name, ctx.target)?
            .first()
            .map(|parent| parent.merge_base);

        Ok(vec![BaseVersionCandidate::new(
            VersionStrategyKind::VersionInBranchName,
            version,
            branch_point,
            format!("version in branch name '{}'", name),
        )
        .without_increment()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Configuration};
    use crate::domain::SemanticVersion;
    use crate::git::MockRepository;

    #[test]
    fn test_release_branch_version_from_branch_point() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.branch("develop");
        let fork = repo.commit("d");
        repo.branch("release/1.3.0");
        let tip = repo.commit("r");
        let config = Configuration::build(&Config::default()).unwrap();
        let ctx = CalculationContext::new(&repo, &config, tip, "release/1.3.0").unwrap();

        let candidates = VersionInBranchNameStrategy.candidates(&ctx).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].version, SemanticVersion::new(1, 3, 0));
        assert_eq!(candidates[0].source, Some(fork));
        assert!(!candidates[0].should_increment);
    }

    #[test]
    fn test_non_release_branch_has_no_candidate() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.branch("feature/1.3.0");
        let tip = repo.commit("f");
        let config = Configuration::build(&Config::default()).unwrap();
        let ctx = CalculationContext::new(&repo, &config, tip, "feature/1.3.0").unwrap();

        assert!(VersionInBranchNameStrategy.candidates(&ctx).unwrap().is_empty());
    }
}
