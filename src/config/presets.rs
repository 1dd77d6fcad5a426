use crate::config::{
    BranchSettings, CommitMessageIncrementMode, DeploymentMode, IncrementStrategy,
    VersionStrategyKind,
};
use crate::domain::BranchGroup;
use serde::{Deserialize, Serialize};

/// Built-in branching workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Workflow {
    #[default]
    GitFlow,
    GitHubFlow,
    TrunkBased,
}

const MAIN_PATTERN: &str = "^master$|^main$";
const DEVELOP_PATTERN: &str = "^dev(elop)?(ment)?$";
const RELEASE_PATTERN: &str = "^releases?[/-](?P<BranchName>.+)";
const HOTFIX_PATTERN: &str = "^hotfix(es)?[/-](?P<BranchName>.+)";
const FEATURE_PATTERN: &str = "^features?[/-](?P<BranchName>.+)";
const SUPPORT_PATTERN: &str = "^support[/-](?P<BranchName>.+)";
const PULL_REQUEST_PATTERN: &str = r"^(pull|pull-requests|pr)[/-](?P<Number>\d+)";

fn settings(
    regex: Option<&str>,
    increment: IncrementStrategy,
    label: &str,
    mode: DeploymentMode,
) -> BranchSettings {
    BranchSettings {
        regex: regex.map(str::to_string),
        increment: Some(increment),
        label: Some(label.to_string()),
        mode: Some(mode),
        ..BranchSettings::default()
    }
}

impl Workflow {
    /// Global defaults every group layers over
    pub fn defaults(&self) -> BranchSettings {
        BranchSettings {
            regex: None,
            increment: Some(IncrementStrategy::Inherit),
            label: Some("{BranchName}".to_string()),
            mode: Some(DeploymentMode::ContinuousDelivery),
            track_merge_target: Some(false),
            tracks_release_branches: Some(false),
            is_main_branch: Some(false),
            is_release_branch: Some(false),
            prevent_increment_when_current_commit_tagged: Some(true),
            prevent_increment_of_merged_branch: Some(false),
            commit_message_incrementing: Some(CommitMessageIncrementMode::Enabled),
        }
    }

    /// Strategies enabled when the document lists none
    pub fn strategies(&self) -> Vec<VersionStrategyKind> {
        match self {
            Workflow::GitFlow | Workflow::GitHubFlow => vec![
                VersionStrategyKind::Fallback,
                VersionStrategyKind::ConfiguredNextVersion,
                VersionStrategyKind::VersionInBranchName,
                VersionStrategyKind::TaggedCommit,
                VersionStrategyKind::TrackReleaseBranches,
            ],
            Workflow::TrunkBased => vec![
                VersionStrategyKind::ConfiguredNextVersion,
                VersionStrategyKind::TrunkBased,
            ],
        }
    }

    /// Group settings of the workflow; groups it does not define are absent
    pub fn groups(&self) -> Vec<(BranchGroup, BranchSettings)> {
        use DeploymentMode::{ContinuousDelivery, ContinuousDeployment, ManualDeployment};
        use IncrementStrategy::{Inherit, Minor, Patch};

        match self {
            Workflow::GitFlow => vec![
                (
                    BranchGroup::Support,
                    BranchSettings {
                        is_main_branch: Some(true),
                        prevent_increment_of_merged_branch: Some(true),
                        ..settings(Some(SUPPORT_PATTERN), Patch, "", ContinuousDelivery)
                    },
                ),
                (
                    BranchGroup::Hotfix,
                    BranchSettings {
                        is_release_branch: Some(true),
                        prevent_increment_when_current_commit_tagged: Some(false),
                        ..settings(Some(HOTFIX_PATTERN), Patch, "beta", ManualDeployment)
                    },
                ),
                (
                    BranchGroup::Release,
                    BranchSettings {
                        is_release_branch: Some(true),
                        prevent_increment_when_current_commit_tagged: Some(false),
                        ..settings(Some(RELEASE_PATTERN), Minor, "beta", ManualDeployment)
                    },
                ),
                (
                    BranchGroup::Main,
                    BranchSettings {
                        is_main_branch: Some(true),
                        prevent_increment_of_merged_branch: Some(true),
                        ..settings(Some(MAIN_PATTERN), Patch, "", ContinuousDelivery)
                    },
                ),
                (
                    BranchGroup::Develop,
                    BranchSettings {
                        track_merge_target: Some(true),
                        tracks_release_branches: Some(true),
                        ..settings(Some(DEVELOP_PATTERN), Minor, "alpha", ContinuousDeployment)
                    },
                ),
                (
                    BranchGroup::Feature,
                    settings(Some(FEATURE_PATTERN), Inherit, "{BranchName}", ManualDeployment),
                ),
                (
                    BranchGroup::PullRequest,
                    settings(
                        Some(PULL_REQUEST_PATTERN),
                        Inherit,
                        "PullRequest",
                        ContinuousDelivery,
                    ),
                ),
                (
                    BranchGroup::Unknown,
                    settings(None, Inherit, "{BranchName}", ManualDeployment),
                ),
            ],
            Workflow::GitHubFlow => vec![
                (
                    BranchGroup::Release,
                    BranchSettings {
                        is_release_branch: Some(true),
                        prevent_increment_when_current_commit_tagged: Some(false),
                        ..settings(Some(RELEASE_PATTERN), Patch, "beta", ManualDeployment)
                    },
                ),
                (
                    BranchGroup::Main,
                    BranchSettings {
                        is_main_branch: Some(true),
                        prevent_increment_of_merged_branch: Some(true),
                        ..settings(Some(MAIN_PATTERN), Patch, "", ContinuousDelivery)
                    },
                ),
                (
                    BranchGroup::Feature,
                    settings(Some(FEATURE_PATTERN), Inherit, "{BranchName}", ManualDeployment),
                ),
                (
                    BranchGroup::PullRequest,
                    settings(
                        Some(PULL_REQUEST_PATTERN),
                        Inherit,
                        "PullRequest",
                        ContinuousDelivery,
                    ),
                ),
                (
                    BranchGroup::Unknown,
                    settings(None, Inherit, "{BranchName}", ManualDeployment),
                ),
            ],
            Workflow::TrunkBased => vec![
                (
                    BranchGroup::Hotfix,
                    settings(Some(HOTFIX_PATTERN), Patch, "{BranchName}", ContinuousDelivery),
                ),
                (
                    BranchGroup::Main,
                    BranchSettings {
                        is_main_branch: Some(true),
                        ..settings(Some(MAIN_PATTERN), Patch, "", ContinuousDeployment)
                    },
                ),
                (
                    BranchGroup::Feature,
                    settings(Some(FEATURE_PATTERN), Minor, "{BranchName}", ContinuousDelivery),
                ),
                (
                    BranchGroup::PullRequest,
                    settings(
                        Some(PULL_REQUEST_PATTERN),
                        Inherit,
                        "PullRequest",
                        ContinuousDelivery,
                    ),
                ),
                (
                    BranchGroup::Unknown,
                    settings(None, Patch, "{BranchName}", ContinuousDelivery),
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gitflow_defines_every_group() {
        let groups: Vec<BranchGroup> = Workflow::GitFlow.groups().into_iter().map(|(g, _)| g).collect();
        assert_eq!(groups, BranchGroup::ALL.to_vec());
    }

    #[test]
    fn test_gitflow_develop_tracks_release_branches() {
        let develop = Workflow::GitFlow
            .groups()
            .into_iter()
            .find(|(g, _)| *g == BranchGroup::Develop)
            .map(|(_, s)| s)
            .unwrap();
        assert_eq!(develop.tracks_release_branches, Some(true));
        assert_eq!(develop.label.as_deref(), Some("alpha"));
    }

    #[test]
    fn test_trunk_based_strategies() {
        assert_eq!(
            Workflow::TrunkBased.strategies(),
            vec![
                VersionStrategyKind::ConfiguredNextVersion,
                VersionStrategyKind::TrunkBased
            ]
        );
    }
}
