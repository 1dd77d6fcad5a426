//! Configuration document, workflow presets and effective per-branch settings

mod compiled;
mod effective;
mod presets;

pub use compiled::{Configuration, GroupConfig};
pub use effective::{ConfigurationResolver, EffectiveConfiguration};
pub use presets::Workflow;

use crate::domain::{SemanticVersionFormat, VersionField};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// How a branch bumps its version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncrementStrategy {
    None,
    Patch,
    Minor,
    Major,
    /// Use the increment of the branch this one was created from
    Inherit,
}

impl IncrementStrategy {
    /// The concrete field, None for `Inherit`
    pub fn as_field(&self) -> Option<VersionField> {
        match self {
            IncrementStrategy::None => Some(VersionField::None),
            IncrementStrategy::Patch => Some(VersionField::Patch),
            IncrementStrategy::Minor => Some(VersionField::Minor),
            IncrementStrategy::Major => Some(VersionField::Major),
            IncrementStrategy::Inherit => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentMode {
    ManualDeployment,
    ContinuousDelivery,
    ContinuousDeployment,
}

/// Which commit messages are scanned for `+semver:` markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitMessageIncrementMode {
    Disabled,
    Enabled,
    MergeMessageOnly,
}

/// Base version strategies, in the order a configuration lists them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VersionStrategyKind {
    Fallback,
    ConfiguredNextVersion,
    Mainline,
    TaggedCommit,
    TrackReleaseBranches,
    TrunkBased,
    VersionInBranchName,
}

/// Per-branch settings; every field is optional so layers can be merged
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct BranchSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<IncrementStrategy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DeploymentMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_merge_target: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks_release_branches: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_main_branch: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_release_branch: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_increment_when_current_commit_tagged: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_increment_of_merged_branch: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message_incrementing: Option<CommitMessageIncrementMode>,
}

impl BranchSettings {
    /// Layer `over` on top of `self`; values set in `over` win
    pub fn overlay(&self, over: &BranchSettings) -> BranchSettings {
        BranchSettings {
            regex: over.regex.clone().or_else(|| self.regex.clone()),
            increment: over.increment.or(self.increment),
            label: over.label.clone().or_else(|| self.label.clone()),
            mode: over.mode.or(self.mode),
            track_merge_target: over.track_merge_target.or(self.track_merge_target),
            tracks_release_branches: over
                .tracks_release_branches
                .or(self.tracks_release_branches),
            is_main_branch: over.is_main_branch.or(self.is_main_branch),
            is_release_branch: over.is_release_branch.or(self.is_release_branch),
            prevent_increment_when_current_commit_tagged: over
                .prevent_increment_when_current_commit_tagged
                .or(self.prevent_increment_when_current_commit_tagged),
            prevent_increment_of_merged_branch: over
                .prevent_increment_of_merged_branch
                .or(self.prevent_increment_of_merged_branch),
            commit_message_incrementing: over
                .commit_message_incrementing
                .or(self.commit_message_incrementing),
        }
    }
}

/// Commit message marker patterns.
///
/// Unset patterns fall back to the `+semver:` defaults.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct CommitMessageConfig {
    #[serde(default)]
    pub major: Option<String>,

    #[serde(default)]
    pub minor: Option<String>,

    #[serde(default)]
    pub patch: Option<String>,

    #[serde(default)]
    pub none: Option<String>,

    /// Also derive bumps from conventional commit types
    #[serde(default)]
    pub conventional_commits: bool,
}

pub(crate) const DEFAULT_MAJOR_MARKER: &str = r"\+semver:\s?(breaking|major)";
pub(crate) const DEFAULT_MINOR_MARKER: &str = r"\+semver:\s?(feature|minor)";
pub(crate) const DEFAULT_PATCH_MARKER: &str = r"\+semver:\s?(fix|patch)";
pub(crate) const DEFAULT_NONE_MARKER: &str = r"\+semver:\s?(none|skip)";
pub(crate) const DEFAULT_TAG_PREFIX: &str = "[vV]?";
pub(crate) const DEFAULT_MAX_INHERIT_DEPTH: usize = 32;

/// Represents the complete configuration document for git-semver.
///
/// The workflow preset supplies branch groups and strategies; every other
/// field layers over it.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub workflow: Workflow,

    #[serde(default)]
    pub next_version: Option<String>,

    #[serde(default)]
    pub version_strategies: Option<Vec<VersionStrategyKind>>,

    #[serde(default)]
    pub semantic_version_format: Option<SemanticVersionFormat>,

    #[serde(default)]
    pub tag_prefix: Option<String>,

    #[serde(default)]
    pub max_inherit_depth: Option<usize>,

    /// Maximum number of commit visits per calculation
    #[serde(default)]
    pub step_budget: Option<u64>,

    #[serde(default)]
    pub commit_message: CommitMessageConfig,

    /// Global defaults every branch group inherits
    #[serde(default)]
    pub defaults: BranchSettings,

    /// Branch group settings keyed by group name
    #[serde(default)]
    pub branches: BTreeMap<String, BranchSettings>,

    /// Settings for individual branches, keyed by exact branch name
    #[serde(default)]
    pub overrides: BTreeMap<String, BranchSettings>,
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check every pattern, template and version string in the document
    pub fn validate(&self) -> Result<()> {
        Configuration::build(self).map(|_| ())
    }
}

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "gitsemver.toml";

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitsemver.toml` in current directory
/// 3. `git-semver.toml` in the user config directory
/// 4. Default configuration (GitFlow preset) if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join("git-semver.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    Config::from_toml_str(&config_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_prefers_upper_layer() {
        let base = BranchSettings {
            increment: Some(IncrementStrategy::Patch),
            label: Some("beta".to_string()),
            ..BranchSettings::default()
        };
        let upper = BranchSettings {
            label: Some("rc".to_string()),
            track_merge_target: Some(true),
            ..BranchSettings::default()
        };

        let merged = base.overlay(&upper);
        assert_eq!(merged.increment, Some(IncrementStrategy::Patch));
        assert_eq!(merged.label.as_deref(), Some("rc"));
        assert_eq!(merged.track_merge_target, Some(true));
        assert_eq!(merged.mode, None);
    }

    #[test]
    fn test_parse_document() {
        let config = Config::from_toml_str(
            r#"
workflow = "GitHubFlow"
next_version = "2.0.0"
version_strategies = ["ConfiguredNextVersion", "Mainline"]
semantic_version_format = "Loose"

[defaults]
mode = "ContinuousDeployment"

[branches.feature]
label = "feat-{BranchName}"
increment = "Minor"

[overrides."feature/legacy"]
increment = "Patch"
"#,
        )
        .unwrap();

        assert_eq!(config.workflow, Workflow::GitHubFlow);
        assert_eq!(config.next_version.as_deref(), Some("2.0.0"));
        assert_eq!(
            config.version_strategies,
            Some(vec![
                VersionStrategyKind::ConfiguredNextVersion,
                VersionStrategyKind::Mainline
            ])
        );
        assert_eq!(config.semantic_version_format, Some(SemanticVersionFormat::Loose));
        assert_eq!(config.defaults.mode, Some(DeploymentMode::ContinuousDeployment));
        assert_eq!(
            config.branches["feature"].increment,
            Some(IncrementStrategy::Minor)
        );
        assert_eq!(
            config.overrides["feature/legacy"].increment,
            Some(IncrementStrategy::Patch)
        );
    }

    #[test]
    fn test_parse_rejects_unknown_enum_value() {
        let result = Config::from_toml_str("[defaults]\nincrement = \"Huge\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_increment_strategy_fields() {
        assert_eq!(IncrementStrategy::Minor.as_field(), Some(VersionField::Minor));
        assert_eq!(IncrementStrategy::Inherit.as_field(), None);
    }
}
