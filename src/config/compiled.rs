use crate::config::{
    BranchSettings, Config, VersionStrategyKind, Workflow, DEFAULT_MAJOR_MARKER,
    DEFAULT_MAX_INHERIT_DEPTH, DEFAULT_MINOR_MARKER, DEFAULT_NONE_MARKER, DEFAULT_PATCH_MARKER,
    DEFAULT_TAG_PREFIX,
};
use crate::domain::{BranchGroup, BumpMarkers, SemanticVersion, SemanticVersionFormat, TagPrefix};
use crate::error::{GitSemverError, Result};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// A branch group with its compiled pattern and merged settings
#[derive(Debug, Clone)]
pub struct GroupConfig {
    pub group: BranchGroup,
    /// None when the workflow does not use the group
    pub pattern: Option<Regex>,
    /// Global defaults with the group's settings layered on top
    pub settings: BranchSettings,
}

impl GroupConfig {
    fn matches(&self, name: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(name))
    }
}

/// Validated, compiled configuration.
///
/// Built once from a [Config] document and passed by reference into the
/// calculation; nothing in it changes afterwards.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub workflow: Workflow,
    pub strategies: Vec<VersionStrategyKind>,
    pub next_version: Option<SemanticVersion>,
    pub format: SemanticVersionFormat,
    pub tag_prefix: TagPrefix,
    pub markers: BumpMarkers,
    pub max_inherit_depth: usize,
    pub step_budget: Option<u64>,
    /// Global defaults, before any group layers over them
    pub defaults: BranchSettings,
    /// Groups with a pattern, in priority order
    groups: Vec<GroupConfig>,
    /// Catch-all for names no pattern matches
    unknown: GroupConfig,
    pub overrides: BTreeMap<String, BranchSettings>,
}

/// `{Name}` placeholders of a label template
pub(crate) fn placeholder_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\{([^{}]*)\}").ok())
        .as_ref()
}

/// Check that a label template can only render a valid pre-release label
pub(crate) fn check_label_template(template: &str, pattern: Option<&Regex>) -> Result<()> {
    let placeholders = placeholder_pattern()
        .ok_or_else(|| GitSemverError::config("Placeholder pattern failed to compile"))?;

    for captures in placeholders.captures_iter(template) {
        let name = captures.get(1).map_or("", |m| m.as_str());
        let known = name == "BranchName"
            || pattern.is_some_and(|p| p.capture_names().flatten().any(|n| n == name));
        if !known {
            return Err(GitSemverError::config(format!(
                "Label '{}' uses unknown placeholder '{{{}}}'",
                template, name
            )));
        }
    }

    let literal = placeholders.replace_all(template, "");
    if literal.contains(['.', '+', '{', '}']) {
        return Err(GitSemverError::config(format!(
            "Label '{}' must not contain '.', '+' or unbalanced braces",
            template
        )));
    }

    Ok(())
}

impl Configuration {
    /// Validate a document and compile its patterns
    ///
    /// # Returns
    /// * `Ok(Configuration)` - Ready for calculation
    /// * `Err(Config)` - For invalid patterns, unknown groups, bad label
    ///   templates, an unparsable next version or a bad strategy list
    pub fn build(config: &Config) -> Result<Self> {
        let workflow = config.workflow;
        let format = config.semantic_version_format.unwrap_or_default();

        let strategies = config
            .version_strategies
            .clone()
            .unwrap_or_else(|| workflow.strategies());
        if strategies.is_empty() {
            return Err(GitSemverError::config("version_strategies must not be empty"));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = strategies.iter().find(|s| !seen.insert(**s)) {
            return Err(GitSemverError::config(format!(
                "Strategy {:?} is listed more than once",
                duplicate
            )));
        }

        let next_version = config
            .next_version
            .as_deref()
            .map(|raw| {
                SemanticVersion::parse(raw, format).map_err(|e| {
                    GitSemverError::config(format!("Invalid next_version '{}': {}", raw, e))
                })
            })
            .transpose()?;

        let tag_prefix = TagPrefix::new(config.tag_prefix.as_deref().unwrap_or(DEFAULT_TAG_PREFIX))
            .map_err(|e| GitSemverError::config(format!("Invalid tag_prefix: {}", e)))?;

        let messages = &config.commit_message;
        let markers = BumpMarkers::new(
            messages.major.as_deref().unwrap_or(DEFAULT_MAJOR_MARKER),
            messages.minor.as_deref().unwrap_or(DEFAULT_MINOR_MARKER),
            messages.patch.as_deref().unwrap_or(DEFAULT_PATCH_MARKER),
            messages.none.as_deref().unwrap_or(DEFAULT_NONE_MARKER),
            messages.conventional_commits,
        )
        .map_err(|e| GitSemverError::config(format!("Invalid commit message pattern: {}", e)))?;

        let max_inherit_depth = config.max_inherit_depth.unwrap_or(DEFAULT_MAX_INHERIT_DEPTH);
        if max_inherit_depth == 0 {
            return Err(GitSemverError::config("max_inherit_depth must be at least 1"));
        }

        let mut user_groups = BTreeMap::new();
        for (key, settings) in &config.branches {
            let group: BranchGroup = key.parse()?;
            user_groups.insert(group, settings);
        }

        let defaults = workflow.defaults().overlay(&config.defaults);
        let preset: BTreeMap<BranchGroup, BranchSettings> = workflow.groups().into_iter().collect();

        let mut groups = Vec::with_capacity(BranchGroup::ALL.len());
        let mut unknown = None;
        for group in BranchGroup::ALL {
            let mut settings = defaults.clone();
            if let Some(preset_settings) = preset.get(&group) {
                settings = settings.overlay(preset_settings);
            }
            if let Some(user_settings) = user_groups.get(&group) {
                settings = settings.overlay(user_settings);
            }

            let pattern = settings
                .regex
                .as_deref()
                .map(|raw| {
                    Regex::new(raw).map_err(|e| {
                        GitSemverError::config(format!(
                            "Invalid pattern for branch group '{}': {}",
                            group, e
                        ))
                    })
                })
                .transpose()?;

            if let Some(label) = settings.label.as_deref() {
                check_label_template(label, pattern.as_ref())?;
            }

            let compiled = GroupConfig {
                group,
                pattern,
                settings,
            };
            if group == BranchGroup::Unknown {
                unknown = Some(compiled);
            } else {
                groups.push(compiled);
            }
        }
        let unknown = unknown
            .ok_or_else(|| GitSemverError::config("The unknown branch group is missing"))?;

        let configuration = Configuration {
            workflow,
            strategies,
            next_version,
            format,
            tag_prefix,
            markers,
            max_inherit_depth,
            step_budget: config.step_budget,
            defaults,
            groups,
            unknown,
            overrides: config.overrides.clone(),
        };

        for (name, settings) in &configuration.overrides {
            if let Some(label) = settings.label.as_deref() {
                let group = configuration.classify(name);
                check_label_template(label, group.pattern.as_ref())?;
            }
        }

        Ok(configuration)
    }

    /// First group in priority order whose pattern matches; `unknown` otherwise
    pub fn classify(&self, branch_name: &str) -> &GroupConfig {
        self.groups
            .iter()
            .find(|g| g.matches(branch_name))
            .unwrap_or(&self.unknown)
    }
}
