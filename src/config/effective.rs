use crate::config::compiled::{placeholder_pattern, GroupConfig};
use crate::config::{
    CommitMessageIncrementMode, Configuration, DeploymentMode, IncrementStrategy,
    VersionStrategyKind,
};
use crate::domain::branch::{escape_branch_name, normalize_branch_name};
use crate::domain::{BranchGroup, SemanticVersion, SemanticVersionFormat};
use regex::Captures;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Settings resolved for one branch.
///
/// `increment` may still be `Inherit`; the analyzer resolves it against the
/// branch's ancestry.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfiguration {
    /// Normalized branch name
    pub branch_name: String,
    pub group: BranchGroup,
    pub increment: IncrementStrategy,
    /// Rendered label; None when no layer sets one
    pub label: Option<String>,
    pub deployment_mode: DeploymentMode,
    pub track_merge_target: bool,
    pub tracks_release_branches: bool,
    pub is_main_branch: bool,
    pub is_release_branch: bool,
    pub prevent_increment_when_current_commit_tagged: bool,
    pub prevent_increment_of_merged_branch: bool,
    pub commit_message_incrementing: CommitMessageIncrementMode,
    pub strategies: Vec<VersionStrategyKind>,
    pub next_version: Option<SemanticVersion>,
    pub format: SemanticVersionFormat,
    /// Number captured by a pull request branch pattern
    pub pull_request_number: Option<u64>,
}

impl EffectiveConfiguration {
    /// The label, empty when absent
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    pub fn is_pull_request(&self) -> bool {
        self.group == BranchGroup::PullRequest
    }
}

/// Substitute `{BranchName}` and named captures into a label template
fn render_label(template: &str, branch_name: &str, captures: Option<&Captures<'_>>) -> String {
    let Some(placeholders) = placeholder_pattern() else {
        return template.to_string();
    };

    placeholders
        .replace_all(template, |found: &Captures<'_>| {
            let name = found.get(1).map_or("", |m| m.as_str());
            let value = captures.and_then(|c| c.name(name)).map(|m| m.as_str());
            match (name, value) {
                (_, Some(value)) => escape_branch_name(value),
                ("BranchName", None) => escape_branch_name(branch_name),
                _ => String::new(),
            }
        })
        .into_owned()
}

/// Produces and caches effective configurations per branch name
pub struct ConfigurationResolver<'c> {
    config: &'c Configuration,
    cache: RefCell<HashMap<String, Rc<EffectiveConfiguration>>>,
}

impl<'c> ConfigurationResolver<'c> {
    pub fn new(config: &'c Configuration) -> Self {
        ConfigurationResolver {
            config,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Effective configuration of a branch, computed once per name
    pub fn resolve(&self, branch_name: &str) -> Rc<EffectiveConfiguration> {
        let name = normalize_branch_name(branch_name);
        if let Some(cached) = self.cache.borrow().get(name) {
            return Rc::clone(cached);
        }

        let group = self.config.classify(name);
        let effective = Rc::new(self.build(name, group));
        self.cache
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&effective));
        effective
    }

    fn build(&self, name: &str, group: &GroupConfig) -> EffectiveConfiguration {
        let settings = match self.config.overrides.get(name) {
            Some(over) => group.settings.overlay(over),
            None => group.settings.clone(),
        };
        let captures = group.pattern.as_ref().and_then(|p| p.captures(name));

        let label = settings
            .label
            .as_deref()
            .map(|template| render_label(template, name, captures.as_ref()));
        let pull_request_number = captures
            .as_ref()
            .and_then(|c| c.name("Number"))
            .and_then(|m| m.as_str().parse().ok());

        EffectiveConfiguration {
            branch_name: name.to_string(),
            group: group.group,
            increment: settings.increment.unwrap_or(IncrementStrategy::Inherit),
            label,
            deployment_mode: settings.mode.unwrap_or(DeploymentMode::ContinuousDelivery),
            track_merge_target: settings.track_merge_target.unwrap_or(false),
            tracks_release_branches: settings.tracks_release_branches.unwrap_or(false),
            is_main_branch: settings.is_main_branch.unwrap_or(false),
            is_release_branch: settings.is_release_branch.unwrap_or(false),
            prevent_increment_when_current_commit_tagged: settings
                .prevent_increment_when_current_commit_tagged
                .unwrap_or(true),
            prevent_increment_of_merged_branch: settings
                .prevent_increment_of_merged_branch
                .unwrap_or(false),
            commit_message_incrementing: settings
                .commit_message_incrementing
                .unwrap_or(CommitMessageIncrementMode::Enabled),
            strategies: self.config.strategies.clone(),
            next_version: self.config.next_version.clone(),
            format: self.config.format,
            pull_request_number,
        }
    }
}
