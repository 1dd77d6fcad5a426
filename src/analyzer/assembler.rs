//! Pre-release tag and build metadata of the final version

use crate::analyzer::context::CalculationContext;
use crate::analyzer::selector::SelectedCandidate;
use crate::config::DeploymentMode;
use crate::domain::{BuildMetaData, PreReleaseTag, SemanticVersion, Tag};
use crate::error::{GitSemverError, Result};
use crate::git::Repository;

/// Label a version is rendered with on the context's branch
pub fn effective_label<R: Repository>(ctx: &CalculationContext<'_, R>, height: u64) -> String {
    if ctx.branch.is_pull_request() {
        return format!("PullRequest{}", height);
    }
    ctx.branch.label().to_string()
}

/// Reachable tags of `version`'s core whose pre-release label is `label`
fn same_label_tags<'c, R: Repository>(
    ctx: &'c CalculationContext<'_, R>,
    version: &SemanticVersion,
    label: &str,
) -> Result<Vec<&'c Tag>> {
    Ok(ctx
        .reachable_tags(ctx.target)?
        .into_iter()
        .filter(|tag| {
            tag.version.as_ref().is_some_and(|v| {
                v.is_pre_release() && v.same_core(version) && v.label().eq_ignore_ascii_case(label)
            })
        })
        .collect())
}

/// The reachable pre-release tag of `version`'s core and the branch label
/// closest to the target.
///
/// A version prepared on a branch counts its height from such a tag rather
/// than from an older release the version was bumped from. Pull requests
/// have no fixed label and never anchor.
pub fn nearest_label_tag<'c, R: Repository>(
    ctx: &'c CalculationContext<'_, R>,
    version: &SemanticVersion,
) -> Result<Option<&'c Tag>> {
    let label = ctx.branch.label();
    if ctx.branch.is_pull_request() || label.is_empty() {
        return Ok(None);
    }

    let mut nearest: Option<(u64, &Tag)> = None;
    for tag in same_label_tags(ctx, version, label)? {
        let distance = ctx.graph.distance(Some(tag.target), ctx.target)?;
        let closer = match nearest {
            None => true,
            Some((best, current)) => {
                distance < best || (distance == best && tag.version > current.version)
            }
        };
        if closer {
            nearest = Some((distance, tag));
        }
    }
    Ok(nearest.map(|(_, tag)| tag))
}

/// Pre-release number for `core-label`: the count of reachable tags sharing
/// both, plus one unless the target carries one of them
fn next_pre_release_number<R: Repository>(
    ctx: &CalculationContext<'_, R>,
    version: &SemanticVersion,
    label: &str,
) -> Result<u64> {
    let tags = same_label_tags(ctx, version, label)?;
    let on_target = tags.iter().any(|tag| tag.target == ctx.target);
    let count = tags.len() as u64;
    Ok(if on_target { count } else { count + 1 })
}

/// Render the selected version for the context's branch.
///
/// `height` is the commit distance from the winner's source. The returned
/// version carries build metadata; `commits_since_tag` is only set when the
/// canonical string shows it.
pub fn assemble<R: Repository>(
    ctx: &CalculationContext<'_, R>,
    selected: &SelectedCandidate,
    height: u64,
) -> Result<SemanticVersion> {
    let base = &selected.incremented;

    if selected.frozen {
        let mut version = base.clone();
        version.build_metadata = None;
        return Ok(version);
    }

    let label = effective_label(ctx, height);
    let mode = if ctx.branch.is_pull_request() {
        DeploymentMode::ContinuousDelivery
    } else {
        ctx.branch.deployment_mode
    };

    let (pre_release, commits_since_tag) = match mode {
        DeploymentMode::ManualDeployment | DeploymentMode::ContinuousDelivery => {
            if label.is_empty() {
                (None, Some(height))
            } else {
                let number = next_pre_release_number(ctx, base, &label)?;
                (Some(PreReleaseTag::new(label, Some(number))), Some(height))
            }
        }
        DeploymentMode::ContinuousDeployment => {
            if label.is_empty() {
                (None, None)
            } else {
                let start = match base
                    .pre_release
                    .as_ref()
                    .filter(|p| p.matches_label(&label))
                    .and_then(|p| p.number)
                {
                    Some(number) => number,
                    None => nearest_label_tag(ctx, base)?
                        .and_then(|tag| tag.version.as_ref())
                        .and_then(|v| v.pre_release.as_ref())
                        .and_then(|p| p.number)
                        .unwrap_or(0),
                };
                let number = start.checked_add(height).ok_or_else(|| {
                    GitSemverError::version(format!(
                        "pre-release number of {} overflows at height {}",
                        base, height
                    ))
                })?;
                (Some(PreReleaseTag::new(label, Some(number))), None)
            }
        }
    };

    Ok(SemanticVersion {
        major: base.major,
        minor: base.minor,
        patch: base.patch,
        pre_release,
        build_metadata: Some(BuildMetaData {
            commits_since_tag,
            ..BuildMetaData::default()
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::strategies::BaseVersionCandidate;
    use crate::config::{Config, Configuration, VersionStrategyKind};
    use crate::git::MockRepository;

    fn configuration() -> Configuration {
        Configuration::build(&Config::default()).unwrap()
    }

    fn selected(version: SemanticVersion) -> SelectedCandidate {
        SelectedCandidate {
            candidate: BaseVersionCandidate::new(
                VersionStrategyKind::TaggedCommit,
                version.clone(),
                None,
                "test",
            ),
            incremented: version,
            frozen: false,
        }
    }

    #[test]
    fn test_manual_deployment_numbers_from_one() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.branch("feature/foo");
        let tip = repo.commit("b");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "feature/foo").unwrap();

        let version = assemble(&ctx, &selected(SemanticVersion::new(1, 2, 1)), 1).unwrap();
        assert_eq!(version.full_sem_ver(), "1.2.1-foo.1+1");
    }

    #[test]
    fn test_manual_deployment_counts_same_label_tags() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.tag("1.2.0");
        repo.branch("feature/foo");
        repo.commit("b");
        repo.tag("1.2.1-foo.1");
        repo.commit("c");
        repo.tag("1.2.1-foo.5");
        // other core and other label do not count
        repo.tag("1.2.1-bar.2");
        repo.tag("1.1.0-foo.9");
        let tip = repo.commit("d");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "feature/foo").unwrap();

        let version = assemble(&ctx, &selected(SemanticVersion::new(1, 2, 1)), 1).unwrap();
        assert_eq!(version.full_sem_ver(), "1.2.1-foo.3+1");
    }

    #[test]
    fn test_tagged_target_keeps_count() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.branch("hotfix/next");
        repo.commit("b");
        repo.tag("1.2.1-beta.1");
        let tip = repo.commit("c");
        repo.tag("1.2.1-beta.2");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "hotfix/next").unwrap();

        let version = assemble(&ctx, &selected(SemanticVersion::new(1, 2, 1)), 0).unwrap();
        assert_eq!(version.full_sem_ver(), "1.2.1-beta.2+0");
    }

    #[test]
    fn test_nearest_label_tag() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.tag("1.2.0");
        repo.branch("feature/foo");
        repo.commit("b");
        repo.tag("1.2.1-foo.1");
        let near = repo.commit("c");
        repo.tag("1.2.1-foo.5");
        let tip = repo.commit("d");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "feature/foo").unwrap();

        let tag = nearest_label_tag(&ctx, &SemanticVersion::new(1, 2, 1)).unwrap().unwrap();
        assert_eq!(tag.target, near);
        assert!(nearest_label_tag(&ctx, &SemanticVersion::new(1, 3, 0))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_empty_label_keeps_height_in_metadata() {
        let mut repo = MockRepository::new();
        let tip = repo.commit("a");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "main").unwrap();

        let version = assemble(&ctx, &selected(SemanticVersion::new(1, 0, 1)), 3).unwrap();
        assert_eq!(version.full_sem_ver(), "1.0.1+3");
    }

    #[test]
    fn test_continuous_deployment_folds_height() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.branch("develop");
        let tip = repo.commit("b");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "develop").unwrap();

        let version = assemble(&ctx, &selected(SemanticVersion::new(1, 1, 0)), 4).unwrap();
        assert_eq!(version.full_sem_ver(), "1.1.0-alpha.4");
        assert_eq!(version.build_metadata.unwrap().commits_since_tag, None);
    }

    #[test]
    fn test_continuous_deployment_overflow_is_an_error() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.branch("develop");
        let tip = repo.commit("b");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "develop").unwrap();

        let base = SemanticVersion::new(1, 1, 0).with_pre_release("alpha", Some(u64::MAX));
        assert!(matches!(
            assemble(&ctx, &selected(base), 1),
            Err(GitSemverError::Version(_))
        ));
    }

    #[test]
    fn test_pull_request_label_uses_height() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        repo.branch("pull/7/merge");
        let tip = repo.commit("b");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "pull/7/merge").unwrap();

        let version = assemble(&ctx, &selected(SemanticVersion::new(1, 0, 1)), 2).unwrap();
        assert_eq!(version.full_sem_ver(), "1.0.1-PullRequest2.1+2");
    }

    #[test]
    fn test_frozen_is_verbatim() {
        let mut repo = MockRepository::new();
        let tip = repo.commit("a");
        let config = configuration();
        let ctx = CalculationContext::new(&repo, &config, tip, "main").unwrap();

        let mut frozen = selected(SemanticVersion::new(1, 2, 0));
        frozen.frozen = true;
        assert_eq!(assemble(&ctx, &frozen, 0).unwrap().full_sem_ver(), "1.2.0");
    }
}
