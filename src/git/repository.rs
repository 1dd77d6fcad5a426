use crate::domain::{Branch, Commit};
use crate::error::{GitSemverError, Result};
use crate::git::{Head, TagRef};
use git2::{BranchType, ErrorCode, Oid, Repository as Git2Repo, Sort, StatusOptions};
use std::path::Path;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Resolve a revision (sha, branch or tag name) to a commit id
    pub fn resolve(&self, rev: &str) -> Result<Oid> {
        let object = self.repo.revparse_single(rev)?;
        Ok(object.peel_to_commit()?.id())
    }

    fn missing(oid: Oid, e: git2::Error) -> GitSemverError {
        if e.code() == ErrorCode::NotFound {
            GitSemverError::graph(format!("Commit {} is missing: {}", oid, e.message()))
        } else {
            GitSemverError::Git(e)
        }
    }
}

impl super::Repository for Git2Repository {
    fn head(&self) -> Result<Head> {
        let head = self
            .repo
            .head()
            .map_err(|_| GitSemverError::BranchNotFound("HEAD".to_string()))?;

        let commit = head.peel_to_commit()?.id();
        let branch = if head.is_branch() {
            head.shorthand().map(str::to_string)
        } else {
            None
        };

        Ok(Head { branch, commit })
    }

    fn list_branches(&self) -> Result<Vec<Branch>> {
        let mut branches = Vec::new();

        for entry in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            let Some(name) = branch.name()? else {
                continue;
            };
            if let Some(tip) = branch.get().target() {
                branches.push(Branch::new(name, tip));
            }
        }

        branches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(branches)
    }

    fn list_tags(&self) -> Result<Vec<TagRef>> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::new();

        for name in names.iter().flatten() {
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            // Tags on trees or blobs carry no version for a commit
            if let Ok(commit) = reference.peel_to_commit() {
                tags.push(TagRef {
                    name: name.to_string(),
                    target: commit.id(),
                });
            }
        }

        Ok(tags)
    }

    fn get_commit(&self, oid: Oid) -> Result<Commit> {
        let commit = self
            .repo
            .find_commit(oid)
            .map_err(|e| Self::missing(oid, e))?;
        let author_time = commit.author().when().seconds();

        Ok(Commit {
            id: oid,
            parents: commit.parent_ids().collect(),
            message: commit.message().unwrap_or("").to_string(),
            author_time,
            commit_time: commit.time().seconds(),
        })
    }

    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        self.repo
            .graph_descendant_of(descendant, ancestor)
            .map_err(|e| Self::missing(descendant, e))
    }

    fn merge_base(&self, a: Oid, b: Oid) -> Result<Option<Oid>> {
        match self.repo.merge_base(a, b) {
            Ok(oid) => Ok(Some(oid)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn commits_between(&self, from: Option<Oid>, to: Oid) -> Result<Vec<Commit>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push(to).map_err(|e| Self::missing(to, e))?;
        if let Some(from) = from {
            revwalk.hide(from).map_err(|e| Self::missing(from, e))?;
        }

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result.map_err(|e| Self::missing(to, e))?;
            commits.push(self.get_commit(oid)?);
        }

        Ok(commits)
    }

    fn uncommitted_file_count(&self) -> Result<usize> {
        if self.repo.is_bare() {
            return Ok(0);
        }

        let mut options = StatusOptions::new();
        options.include_untracked(true).include_ignored(false);
        let statuses = self.repo.statuses(Some(&mut options))?;

        Ok(statuses.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use tempfile::TempDir;

    fn commit_file(repo: &Git2Repo, message: &str) -> Oid {
        let sig = git2::Signature::now("Test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn test_reads_history_and_tags() {
        let dir = TempDir::new().unwrap();
        let raw = Git2Repo::init(dir.path()).unwrap();
        let first = commit_file(&raw, "first");
        let second = commit_file(&raw, "second +semver: minor");
        let object = raw.find_object(first, None).unwrap();
        raw.tag_lightweight("v1.0.0", &object, false).unwrap();
        drop(object);

        let repo = Git2Repository::from_git2(raw);
        let head = repo.head().unwrap();
        assert_eq!(head.commit, second);
        assert!(head.branch.is_some());

        let tags = repo.list_tags().unwrap();
        assert_eq!(tags, vec![TagRef { name: "v1.0.0".to_string(), target: first }]);

        let between = repo.commits_between(Some(first), second).unwrap();
        assert_eq!(between.len(), 1);
        assert_eq!(between[0].summary(), "second +semver: minor");
        assert!(repo.is_ancestor(first, second).unwrap());
        assert_eq!(repo.merge_base(first, second).unwrap(), Some(first));
    }

    #[test]
    fn test_open_outside_repository_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Git2Repository::open(dir.path()).is_err());
    }
}
