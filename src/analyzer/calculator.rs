//! Top-level version calculation: strategies, selection, increment and rendering

use crate::analyzer::assembler::{assemble, nearest_label_tag};
use crate::analyzer::context::CalculationContext;
use crate::analyzer::selector::{select, SelectedCandidate};
use crate::analyzer::strategies::{strategy_for, BaseVersionCandidate};
use crate::config::{Configuration, ConfigurationResolver, VersionStrategyKind};
use crate::domain::branch::normalize_branch_name;
use crate::domain::{BranchGroup, BuildMetaData, SemanticVersion};
use crate::error::Result;
use crate::git::Repository;
use crate::output::SemanticVersionInfo;
use crate::warnings::CalculationWarning;
use git2::Oid;
use tracing::{debug, info, warn};

/// Branch name used when no branch points at a detached target
pub const DETACHED_BRANCH_NAME: &str = "HEAD";

/// Outcome of one calculation
#[derive(Debug, Clone)]
pub struct Calculation {
    /// The version with full build metadata
    pub version: SemanticVersion,
    pub info: SemanticVersionInfo,
    /// Conditions the calculation recovered from
    pub warnings: Vec<CalculationWarning>,
    /// The base version everything was derived from
    pub winner: BaseVersionCandidate,
}

/// Calculates versions for commits of one repository under one configuration.
///
/// # Example
///
/// ```rust
/// use git_semver::analyzer::VersionCalculator;
/// use git_semver::config::{Config, Configuration};
/// use git_semver::git::MockRepository;
///
/// # fn main() -> git_semver::Result<()> {
/// let mut repo = MockRepository::new();
/// repo.commit("initial");
/// repo.tag("1.2.0");
///
/// let config = Configuration::build(&Config::default())?;
/// let calculation = VersionCalculator::new(&repo, &config).calculate(None, None)?;
/// assert_eq!(calculation.info.full_sem_ver, "1.2.0");
/// # Ok(())
/// # }
/// ```
pub struct VersionCalculator<'a, R: Repository> {
    repo: &'a R,
    config: &'a Configuration,
}

impl<'a, R: Repository> VersionCalculator<'a, R> {
    pub fn new(repo: &'a R, config: &'a Configuration) -> Self {
        VersionCalculator { repo, config }
    }

    /// Calculate the version of `target` (HEAD when None) as seen from
    /// `branch` (the checked-out branch, or one inferred for a detached HEAD).
    pub fn calculate(&self, target: Option<Oid>, branch: Option<&str>) -> Result<Calculation> {
        let head = self.repo.head()?;
        let target = target.unwrap_or(head.commit);
        let branch_name = match branch {
            Some(name) => normalize_branch_name(name).to_string(),
            None if target == head.commit && head.branch.is_some() => head
                .branch
                .as_deref()
                .map(normalize_branch_name)
                .unwrap_or(DETACHED_BRANCH_NAME)
                .to_string(),
            None => self.infer_branch(target)?,
        };
        info!(branch = %branch_name, target = %target, "calculating version");

        let ctx = CalculationContext::new(self.repo, self.config, target, &branch_name)?;
        let candidates = self.collect_candidates(&ctx)?;
        let selected = match select(&ctx, candidates)? {
            Some(selected) => selected,
            None => fallback_selection(),
        };

        let height = if selected.frozen {
            0
        } else {
            match selected.candidate.replay_distance {
                Some(distance) => distance,
                None => {
                    let from_source = ctx.graph.distance(selected.candidate.source, target)?;
                    match nearest_label_tag(&ctx, &selected.incremented)? {
                        Some(tag) => from_source.min(ctx.graph.distance(Some(tag.target), target)?),
                        None => from_source,
                    }
                }
            }
        };

        let mut version = assemble(&ctx, &selected, height)?;
        let commit = self.repo.get_commit(target)?;
        let rendered = version.build_metadata.take().unwrap_or_default();
        version.build_metadata = Some(BuildMetaData {
            commits_since_version_source: ctx
                .graph
                .distance(selected.candidate.source, target)?,
            sha: Some(target.to_string()),
            version_source_sha: selected.candidate.source.map(|oid| oid.to_string()),
            branch: Some(branch_name.clone()),
            commit_date: commit.commit_date(),
            uncommitted_changes: self.repo.uncommitted_file_count()?,
            ..rendered
        });

        let info = SemanticVersionInfo::new(&version, height, ctx.branch.pull_request_number);
        debug!(
            version = %info.full_sem_ver,
            steps = ctx.graph.steps(),
            "calculation finished"
        );

        Ok(Calculation {
            version,
            info,
            warnings: ctx.take_warnings(),
            winner: selected.candidate,
        })
    }

    /// Run every enabled strategy; strategies that hit missing history are skipped
    fn collect_candidates(
        &self,
        ctx: &CalculationContext<'_, R>,
    ) -> Result<Vec<BaseVersionCandidate>> {
        let mut candidates = Vec::new();
        for strategy in ctx.branch.strategies.iter().map(|kind| strategy_for::<R>(*kind)) {
            match strategy.candidates(ctx) {
                Ok(found) => {
                    debug!(strategy = ?strategy.kind(), count = found.len(), "strategy finished");
                    candidates.extend(found);
                }
                Err(e) if e.is_recoverable() => {
                    ctx.warn(CalculationWarning::StrategySkipped {
                        strategy: strategy.kind(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(candidates)
    }

    /// Pick a branch for a commit HEAD does not name: a branch whose tip is
    /// the commit, highest-priority group first, else the detached name
    fn infer_branch(&self, target: Oid) -> Result<String> {
        let resolver = ConfigurationResolver::new(self.config);
        let mut at_target: Vec<(BranchGroup, String)> = self
            .repo
            .list_branches()?
            .into_iter()
            .filter(|b| b.tip == target)
            .map(|b| {
                let name = normalize_branch_name(&b.name).to_string();
                (resolver.resolve(&name).group, name)
            })
            .collect();
        at_target.sort();

        match at_target.into_iter().next() {
            Some((_, name)) => Ok(name),
            None => {
                warn!(target = %target, "no branch points at the target; using detached name");
                Ok(DETACHED_BRANCH_NAME.to_string())
            }
        }
    }
}

fn fallback_selection() -> SelectedCandidate {
    let candidate = BaseVersionCandidate::new(
        VersionStrategyKind::Fallback,
        SemanticVersion::new(0, 0, 0),
        None,
        "no strategy produced a version",
    );
    SelectedCandidate {
        incremented: candidate.version.clone(),
        candidate,
        frozen: false,
    }
}
