use crate::domain::{Branch, Commit};
use crate::error::{GitSemverError, Result};
use crate::git::{Head, Repository, TagRef};
use git2::Oid;
use std::collections::{BTreeMap, HashMap, HashSet};

const EPOCH: i64 = 1_700_000_000;

/// In-memory commit graph for testing without a real repository.
///
/// Commits get sequential ids and timestamps, so every fixture is
/// deterministic. Fixture methods mirror the git porcelain they stand for.
///
/// ```rust
/// # use git_semver::git::MockRepository;
/// let mut repo = MockRepository::new();
/// repo.commit("initial");
/// repo.tag("1.0.0");
/// repo.branch("feature/foo");
/// repo.commit("work");
/// ```
#[derive(Debug, Clone)]
pub struct MockRepository {
    commits: HashMap<Oid, Commit>,
    /// Creation index per commit; parents always have a lower index
    order: HashMap<Oid, usize>,
    branches: BTreeMap<String, Oid>,
    tags: Vec<TagRef>,
    head: HeadState,
    uncommitted: usize,
}

#[derive(Debug, Clone)]
enum HeadState {
    Branch(String),
    Detached(Oid),
}

impl MockRepository {
    /// Create an empty repository with HEAD on an unborn `main`
    pub fn new() -> Self {
        MockRepository {
            commits: HashMap::new(),
            order: HashMap::new(),
            branches: BTreeMap::new(),
            tags: Vec::new(),
            head: HeadState::Branch("main".to_string()),
            uncommitted: 0,
        }
    }

    /// Commit at HEAD
    pub fn head_commit(&self) -> Option<Oid> {
        match &self.head {
            HeadState::Branch(name) => self.branches.get(name).copied(),
            HeadState::Detached(oid) => Some(*oid),
        }
    }

    /// Tip of a branch
    pub fn branch_tip(&self, name: &str) -> Option<Oid> {
        self.branches.get(name).copied()
    }

    fn next_oid(&self) -> Oid {
        let index = self.order.len() as u32 + 1;
        let mut bytes = [0u8; 20];
        bytes[0] = 0xc0;
        bytes[16..].copy_from_slice(&index.to_be_bytes());
        Oid::from_bytes(&bytes).unwrap_or_else(|_| Oid::zero())
    }

    fn insert(&mut self, parents: Vec<Oid>, message: &str) -> Oid {
        let id = self.next_oid();
        let index = self.order.len();
        let time = EPOCH + 60 * index as i64;
        self.commits.insert(
            id,
            Commit {
                id,
                parents,
                message: message.to_string(),
                author_time: time,
                commit_time: time,
            },
        );
        self.order.insert(id, index);
        self.advance_head(id);
        id
    }

    fn advance_head(&mut self, id: Oid) {
        match &self.head {
            HeadState::Branch(name) => {
                self.branches.insert(name.clone(), id);
            }
            HeadState::Detached(_) => self.head = HeadState::Detached(id),
        }
    }

    /// Create a commit on top of HEAD and advance the current branch
    pub fn commit(&mut self, message: &str) -> Oid {
        let parents = self.head_commit().into_iter().collect();
        self.insert(parents, message)
    }

    /// Create a parentless commit on the current branch
    pub fn orphan_commit(&mut self, message: &str) -> Oid {
        self.insert(Vec::new(), message)
    }

    /// Create a branch at HEAD and check it out (`git checkout -b`)
    pub fn branch(&mut self, name: &str) {
        if let Some(tip) = self.head_commit() {
            self.branches.insert(name.to_string(), tip);
        }
        self.head = HeadState::Branch(name.to_string());
    }

    /// Create a branch at a commit without checking it out
    pub fn branch_at(&mut self, name: &str, oid: Oid) {
        self.branches.insert(name.to_string(), oid);
    }

    /// Check out an existing branch
    pub fn checkout(&mut self, name: &str) -> Result<()> {
        if !self.branches.contains_key(name) {
            return Err(GitSemverError::BranchNotFound(name.to_string()));
        }
        self.head = HeadState::Branch(name.to_string());
        Ok(())
    }

    /// Detach HEAD at a commit
    pub fn checkout_commit(&mut self, oid: Oid) {
        self.head = HeadState::Detached(oid);
    }

    /// Merge a branch into HEAD with git's default message
    pub fn merge(&mut self, source: &str) -> Result<Oid> {
        let message = match &self.head {
            HeadState::Branch(target) if target != "main" && target != "master" => {
                format!("Merge branch '{}' into {}", source, target)
            }
            _ => format!("Merge branch '{}'", source),
        };
        self.merge_with_message(source, &message)
    }

    /// Merge a branch into HEAD with a custom message
    pub fn merge_with_message(&mut self, source: &str, message: &str) -> Result<Oid> {
        let source_tip = self
            .branch_tip(source)
            .ok_or_else(|| GitSemverError::BranchNotFound(source.to_string()))?;
        let head = self
            .head_commit()
            .ok_or_else(|| GitSemverError::BranchNotFound("HEAD".to_string()))?;
        Ok(self.insert(vec![head, source_tip], message))
    }

    /// Tag HEAD
    pub fn tag(&mut self, name: &str) {
        if let Some(oid) = self.head_commit() {
            self.tag_at(name, oid);
        }
    }

    /// Tag an arbitrary commit
    pub fn tag_at(&mut self, name: &str, oid: Oid) {
        self.tags.retain(|t| t.name != name);
        self.tags.push(TagRef {
            name: name.to_string(),
            target: oid,
        });
    }

    pub fn delete_branch(&mut self, name: &str) {
        self.branches.remove(name);
    }

    pub fn set_uncommitted(&mut self, count: usize) {
        self.uncommitted = count;
    }

    /// Drop a commit object, as a shallow clone would
    pub fn remove_commit(&mut self, oid: Oid) {
        self.commits.remove(&oid);
    }

    fn ancestors(&self, start: Oid) -> Result<HashSet<Oid>> {
        let mut seen = HashSet::new();
        let mut stack = vec![start];
        while let Some(oid) = stack.pop() {
            if !seen.insert(oid) {
                continue;
            }
            stack.extend(self.get_commit(oid)?.parents);
        }
        Ok(seen)
    }

    fn index_of(&self, oid: &Oid) -> usize {
        self.order.get(oid).copied().unwrap_or(usize::MAX)
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn head(&self) -> Result<Head> {
        let commit = self
            .head_commit()
            .ok_or_else(|| GitSemverError::BranchNotFound("HEAD".to_string()))?;
        let branch = match &self.head {
            HeadState::Branch(name) => Some(name.clone()),
            HeadState::Detached(_) => None,
        };
        Ok(Head { branch, commit })
    }

    fn list_branches(&self) -> Result<Vec<Branch>> {
        Ok(self
            .branches
            .iter()
            .map(|(name, tip)| Branch::new(name.clone(), *tip))
            .collect())
    }

    fn list_tags(&self) -> Result<Vec<TagRef>> {
        Ok(self.tags.clone())
    }

    fn get_commit(&self, oid: Oid) -> Result<Commit> {
        self.commits
            .get(&oid)
            .cloned()
            .ok_or_else(|| GitSemverError::graph(format!("Commit {} is missing", oid)))
    }

    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        Ok(self.ancestors(descendant)?.contains(&ancestor))
    }

    fn merge_base(&self, a: Oid, b: Oid) -> Result<Option<Oid>> {
        let left = self.ancestors(a)?;
        let right = self.ancestors(b)?;
        Ok(left
            .intersection(&right)
            .copied()
            .max_by_key(|oid| self.index_of(oid)))
    }

    fn commits_between(&self, from: Option<Oid>, to: Oid) -> Result<Vec<Commit>> {
        let excluded = match from {
            Some(from) => self.ancestors(from)?,
            None => HashSet::new(),
        };
        let mut ids: Vec<Oid> = self
            .ancestors(to)?
            .into_iter()
            .filter(|oid| !excluded.contains(oid))
            .collect();
        ids.sort_by_key(|oid| self.index_of(oid));
        ids.into_iter().map(|oid| self.get_commit(oid)).collect()
    }

    fn uncommitted_file_count(&self) -> Result<usize> {
        Ok(self.uncommitted)
    }
}
