use crate::analyzer::context::CalculationContext;
use crate::analyzer::increment::{combine, markers_in};
use crate::analyzer::inheritance::resolve_increment;
use crate::analyzer::strategies::{BaseVersionCandidate, VersionStrategy};
use crate::config::{EffectiveConfiguration, VersionStrategyKind};
use crate::domain::tag::preferred_tag;
use crate::domain::{Commit, MergeMessage, SemanticVersion, VersionField};
use crate::error::Result;
use crate::git::Repository;
use git2::Oid;
use tracing::debug;

/// Replays the main branch's first-parent history from its latest tag.
///
/// Every first-parent commit is one bump: merges bump by the larger of the
/// main and merged branch increments, commit-message markers included.
/// Other branches replay main up to their fork point and then take one bump
/// for their own commits.
pub struct MainlineStrategy;

/// Which commits after the base tag count as bump events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReplayMode {
    /// Only the first-parent chain
    FirstParent,
    /// Every commit, including those brought in by merges
    AllCommits,
}

struct Replay {
    version: SemanticVersion,
    base: Option<Oid>,
    /// The base tag sits on the replay start
    exact: bool,
    events: u64,
}

fn bump_for_commit<R: Repository>(
    ctx: &CalculationContext<'_, R>,
    mode: ReplayMode,
    main: &EffectiveConfiguration,
    main_field: VersionField,
    commit: &Commit,
) -> Result<VersionField> {
    let scan = main.commit_message_incrementing;
    let markers = &ctx.config.markers;

    match (mode, commit.is_merge()) {
        (ReplayMode::FirstParent, true) => {
            let merged_field = MergeMessage::parse(&commit.message)
                .and_then(|m| ctx.resolver.resolve(&m.merged_branch).increment.as_field())
                .unwrap_or(VersionField::None);
            let merged = ctx.graph.commits_between(commit.first_parent(), commit.id)?;
            Ok(combine(
                main_field.max(merged_field),
                markers_in(markers, scan, &merged),
            ))
        }
        (ReplayMode::AllCommits, true) => Ok(markers_in(markers, scan, std::slice::from_ref(commit))
            .unwrap_or(VersionField::None)),
        (_, false) => Ok(combine(
            main_field,
            markers_in(markers, scan, std::slice::from_ref(commit)),
        )),
    }
}

fn replay<R: Repository>(
    ctx: &CalculationContext<'_, R>,
    mode: ReplayMode,
    main: &EffectiveConfiguration,
    start: Oid,
) -> Result<Replay> {
    let label = main.label();
    let main_field = main.increment.as_field().unwrap_or(VersionField::Patch);

    let main_tag = |oid: Oid| {
        preferred_tag(&ctx.tags_on(oid), label).filter(|t| t.label().eq_ignore_ascii_case(label))
    };

    let path = ctx.graph.first_parent_path(start, |c| main_tag(c.id).is_some())?;
    let base_tag = path.last().and_then(|c| main_tag(c.id));

    let (mut version, base, exact) = match base_tag {
        Some(tag) => (
            tag.version.clone().unwrap_or_default(),
            Some(tag.target),
            tag.target == start,
        ),
        None => (SemanticVersion::new(0, 0, 0), None, false),
    };

    let events: Vec<Commit> = match mode {
        ReplayMode::FirstParent => path
            .into_iter()
            .rev()
            .filter(|c| Some(c.id) != base)
            .collect(),
        ReplayMode::AllCommits => ctx.graph.commits_between(base, start)?,
    };

    for commit in &events {
        let field = bump_for_commit(ctx, mode, main, main_field, commit)?;
        version = version.increment(field)?;
    }

    Ok(Replay {
        version,
        base,
        exact,
        events: events.len() as u64,
    })
}

/// Candidates shared by the mainline and trunk-based strategies
pub(crate) fn replay_candidates<R: Repository>(
    ctx: &CalculationContext<'_, R>,
    mode: ReplayMode,
    kind: VersionStrategyKind,
) -> Result<Vec<BaseVersionCandidate>> {
    let Some((main_name, main_tip)) = ctx.main_branch() else {
        return Ok(Vec::new());
    };
    let main = ctx.resolver.resolve(&main_name);

    if main_name == ctx.branch.branch_name {
        let replay = replay(ctx, mode, &main, ctx.target)?;
        debug!(version = %replay.version, events = replay.events, "replayed main line");

        let mut candidate = BaseVersionCandidate::new(
            kind,
            replay.version,
            replay.base,
            format!("{} replay of '{}'", mode_name(mode), main_name),
        )
        .without_increment();
        candidate.exact_tag = replay.exact;
        candidate.replay_distance = Some(replay.events);
        return Ok(vec![candidate]);
    }

    let Some(fork) = ctx.repo().merge_base(main_tip, ctx.target)? else {
        return Ok(Vec::new());
    };
    let replay = replay(ctx, mode, &main, fork)?;

    let own = ctx.graph.commits_between(Some(fork), ctx.target)?;
    let mut version = replay.version;
    if !own.is_empty() {
        let branch_field = resolve_increment(ctx, &ctx.branch, ctx.target)?;
        let marker = markers_in(
            &ctx.config.markers,
            ctx.branch.commit_message_incrementing,
            &own,
        );
        version = version.increment(combine(branch_field, marker))?;
    }
    debug!(%version, fork = %fork, commits = own.len(), "replayed branch off main line");

    let mut candidate = BaseVersionCandidate::new(
        kind,
        version,
        Some(fork),
        format!("{} replay of '{}' to fork point", mode_name(mode), main_name),
    )
    .without_increment();
    candidate.replay_distance = Some(own.len() as u64);
    Ok(vec![candidate])
}

fn mode_name(mode: ReplayMode) -> &'static str {
    match mode {
        ReplayMode::FirstParent => "mainline",
        ReplayMode::AllCommits => "trunk",
    }
}

impl<R: Repository> VersionStrategy<R> for MainlineStrategy {
    fn kind(&self) -> VersionStrategyKind {
        VersionStrategyKind::Mainline
    }

    fn candidates(&self, ctx: &CalculationContext<'_, R>) -> Result<Vec<BaseVersionCandidate>> {
        replay_candidates(ctx, ReplayMode::FirstParent, VersionStrategyKind::Mainline)
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
    fn test_each_first_parent_commit_bumps() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.tag("1.0.0");
        repo.commit("b");
        let tip = repo.commit("c");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "main").unwrap();

        let candidates = MainlineStrategy.candidates(&ctx).unwrap();
        assert_eq!(candidates[0].version, SemanticVersion::new(1, 0, 2));
        assert_eq!(candidates[0].replay_distance, Some(2));
        assert!(!candidates[0].should_increment);
    }

    #[test]
    fn test_merge_uses_merged_branch_increment() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.tag("1.0.0");
        repo.branch("develop");
        repo.commit("d1");
        repo.commit("d2");
        repo.checkout("main").unwrap();
        let tip = repo.merge("develop").unwrap();
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "main").unwrap();

        let candidates = MainlineStrategy.candidates(&ctx).unwrap();
        // one first-parent event; develop increments minor
        assert_eq!(candidates[0].version, SemanticVersion::new(1, 1, 0));
        assert_eq!(candidates[0].replay_distance, Some(1));
    }

    #[test]
    fn test_branch_replays_to_fork_then_bumps_once() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.tag("1.0.0");
        repo.branch("develop");
        repo.commit("breaking +semver: major");
        let tip = repo.commit("more");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "develop").unwrap();

        let candidates = MainlineStrategy.candidates(&ctx).unwrap();
        assert_eq!(candidates[0].version, SemanticVersion::new(2, 0, 0));
        assert_eq!(candidates[0].replay_distance, Some(2));
    }

    #[test]
    fn test_exact_tag_on_main() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        let tip = repo.commit("b");
        repo.tag("v3.1.0");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "main").unwrap();

        let candidates = MainlineStrategy.candidates(&ctx).unwrap();
        assert!(candidates[0].exact_tag);
        assert_eq!(candidates[0].version, SemanticVersion::new(3, 1, 0));
        assert_eq!(candidates[0].replay_distance, Some(0));
    }

    #[test]
    fn test_untagged_history_starts_at_zero() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        let tip = repo.commit("feat +semver: minor");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "main").unwrap();

        let candidates = MainlineStrategy.candidates(&ctx).unwrap();
        // 0.0.0 -> 0.0.1 -> 0.1.0
        assert_eq!(candidates[0].version, SemanticVersion::new(0, 1, 0));
        assert_eq!(candidates[0].source, None);
    }
}
