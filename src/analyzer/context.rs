use crate::analyzer::height::CommitGraph;
use crate::config::{Configuration, ConfigurationResolver, EffectiveConfiguration};
use crate::domain::branch::normalize_branch_name;
use crate::domain::{Branch, BranchGroup, Tag, VersionField};
use crate::error::Result;
use crate::git::Repository;
use crate::warnings::CalculationWarning;
use git2::Oid;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::warn;

/// Everything one calculation reads, plus its caches.
///
/// Created per invocation and dropped with it.
pub struct CalculationContext<'a, R: Repository> {
    pub config: &'a Configuration,
    pub resolver: ConfigurationResolver<'a>,
    pub graph: CommitGraph<'a, R>,
    pub target: Oid,
    /// Effective configuration of the branch being versioned
    pub branch: Rc<EffectiveConfiguration>,
    pub branches: Vec<Branch>,
    /// Tags that parse as versions
    tags: Vec<Tag>,
    /// Indices into `tags` per tagged commit
    tags_by_commit: HashMap<Oid, Vec<usize>>,
    warnings: RefCell<Vec<CalculationWarning>>,
    /// Resolved increments per branch name
    pub(crate) increments: RefCell<HashMap<String, VersionField>>,
}

impl<'a, R: Repository> CalculationContext<'a, R> {
    pub fn new(repo: &'a R, config: &'a Configuration, target: Oid, branch_name: &str) -> Result<Self> {
        let resolver = ConfigurationResolver::new(config);
        let branch = resolver.resolve(branch_name);
        let mut warnings = Vec::new();

        let mut tags = Vec::new();
        for tag_ref in repo.list_tags()? {
            let tag = Tag::new(tag_ref.name, tag_ref.target, &config.tag_prefix, config.format);
            if tag.version.is_some() {
                tags.push(tag);
            } else {
                warn!(tag = %tag.name, "ignoring tag that is not a semantic version");
                warnings.push(CalculationWarning::UnparsableTag { tag: tag.name });
            }
        }

        let mut tags_by_commit: HashMap<Oid, Vec<usize>> = HashMap::new();
        for (index, tag) in tags.iter().enumerate() {
            tags_by_commit.entry(tag.target).or_default().push(index);
        }

        Ok(CalculationContext {
            config,
            resolver,
            graph: CommitGraph::new(repo, config.step_budget),
            target,
            branch,
            branches: repo.list_branches()?,
            tags,
            tags_by_commit,
            warnings: RefCell::new(warnings),
            increments: RefCell::new(HashMap::new()),
        })
    }

    pub fn repo(&self) -> &'a R {
        self.graph.repo()
    }

    /// Parseable tags on a commit
    pub fn tags_on(&self, oid: Oid) -> Vec<&Tag> {
        self.tags_by_commit
            .get(&oid)
            .map(|indices| indices.iter().map(|i| &self.tags[*i]).collect())
            .unwrap_or_default()
    }

    /// Parseable tags reachable from `from`
    pub fn reachable_tags(&self, from: Oid) -> Result<Vec<&Tag>> {
        let ancestors = self.graph.ancestors(from)?;
        Ok(self
            .tags
            .iter()
            .filter(|t| ancestors.contains(&t.target))
            .collect())
    }

    pub fn all_tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Whether the target carries a parseable tag
    pub fn target_is_tagged(&self) -> bool {
        self.tags_by_commit.contains_key(&self.target)
    }

    /// Every branch other than the one being versioned
    pub fn other_branches(&self) -> impl Iterator<Item = &Branch> {
        let current = self.branch.branch_name.clone();
        self.branches
            .iter()
            .filter(move |b| normalize_branch_name(&b.name) != current)
    }

    /// The branch main-line history is read from.
    ///
    /// Prefers the branch being versioned when it is a main branch, then the
    /// `main` group, then any other main branch such as `support/*`.
    pub fn main_branch(&self) -> Option<(String, Oid)> {
        if self.branch.is_main_branch {
            return Some((self.branch.branch_name.clone(), self.target));
        }

        let mut mains: Vec<(BranchGroup, &Branch)> = self
            .other_branches()
            .filter_map(|b| {
                let effective = self.resolver.resolve(&b.name);
                effective.is_main_branch.then_some((effective.group, b))
            })
            .collect();
        mains.sort_by(|(ga, a), (gb, b)| {
            (*ga != BranchGroup::Main)
                .cmp(&(*gb != BranchGroup::Main))
                .then_with(|| a.name.cmp(&b.name))
        });
        mains
            .first()
            .map(|(_, b)| (normalize_branch_name(&b.name).to_string(), b.tip))
    }

    pub fn warn(&self, warning: CalculationWarning) {
        warn!("{}", warning);
        self.warnings.borrow_mut().push(warning);
    }

    pub fn take_warnings(&self) -> Vec<CalculationWarning> {
        self.warnings.take()
    }
}
