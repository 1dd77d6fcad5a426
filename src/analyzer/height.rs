//! Commit distance counting with memoized ancestor sets

use crate::domain::Commit;
use crate::error::{GitSemverError, Result};
use crate::git::Repository;
use git2::Oid;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::debug;

/// Per-calculation view of the commit graph.
///
/// Caches ancestor sets and pairwise distances for the lifetime of one
/// calculation, and charges every commit visit against the optional step
/// budget.
pub struct CommitGraph<'r, R: Repository> {
    repo: &'r R,
    ancestors: RefCell<HashMap<Oid, Rc<HashSet<Oid>>>>,
    distances: RefCell<HashMap<(Option<Oid>, Oid), u64>>,
    steps: Cell<u64>,
    budget: Option<u64>,
}

impl<'r, R: Repository> CommitGraph<'r, R> {
    pub fn new(repo: &'r R, budget: Option<u64>) -> Self {
        CommitGraph {
            repo,
            ancestors: RefCell::new(HashMap::new()),
            distances: RefCell::new(HashMap::new()),
            steps: Cell::new(0),
            budget,
        }
    }

    pub fn repo(&self) -> &'r R {
        self.repo
    }

    /// Commit visits charged so far
    pub fn steps(&self) -> u64 {
        self.steps.get()
    }

    fn charge(&self, visits: u64) -> Result<()> {
        let total = self.steps.get() + visits;
        self.steps.set(total);
        if let Some(budget) = self.budget {
            if total > budget {
                return Err(GitSemverError::StepBudgetExceeded { budget });
            }
        }
        Ok(())
    }

    /// Every commit reachable from `oid`, itself included.
    ///
    /// Parents missing from the object store end the walk on that path, the
    /// way a shallow clone's boundary does.
    pub fn ancestors(&self, oid: Oid) -> Result<Rc<HashSet<Oid>>> {
        if let Some(cached) = self.ancestors.borrow().get(&oid) {
            return Ok(Rc::clone(cached));
        }

        // The start itself must exist
        let start = self.repo.get_commit(oid)?;
        self.charge(1)?;

        let mut set = HashSet::from([oid]);
        let mut stack = start.parents;
        while let Some(current) = stack.pop() {
            if set.contains(&current) {
                continue;
            }
            if let Some(cached) = self.ancestors.borrow().get(&current) {
                set.extend(cached.iter().copied());
                continue;
            }
            match self.repo.get_commit(current) {
                Ok(commit) => {
                    self.charge(1)?;
                    set.insert(current);
                    stack.extend(commit.parents);
                }
                Err(e) if e.is_recoverable() => {
                    debug!(commit = %current, "history boundary reached");
                }
                Err(e) => return Err(e),
            }
        }

        let set = Rc::new(set);
        self.ancestors.borrow_mut().insert(oid, Rc::clone(&set));
        Ok(set)
    }

    /// Number of commits reachable from `target` but not from `source`.
    ///
    /// `None` for `source` counts from the start of history.
    pub fn distance(&self, source: Option<Oid>, target: Oid) -> Result<u64> {
        if let Some(known) = self.distances.borrow().get(&(source, target)) {
            return Ok(*known);
        }

        let reachable = self.ancestors(target)?;
        let count = match source {
            Some(source) => {
                let excluded = self.ancestors(source)?;
                reachable.difference(&excluded).count()
            }
            None => reachable.len(),
        };
        let count = count as u64;

        self.distances.borrow_mut().insert((source, target), count);
        Ok(count)
    }

    /// Whether `ancestor` is reachable from `descendant`, using the cache
    pub fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        Ok(self.ancestors(descendant)?.contains(&ancestor))
    }

    /// Commits in `(from, to]`, parents first, charged against the budget
    pub fn commits_between(&self, from: Option<Oid>, to: Oid) -> Result<Vec<Commit>> {
        let commits = self.repo.commits_between(from, to)?;
        self.charge(commits.len() as u64)?;
        Ok(commits)
    }

    /// Follow first parents from `start` until `stop` returns true or history ends.
    ///
    /// Returns the visited commits newest first, including the stopping commit.
    pub fn first_parent_path(
        &self,
        start: Oid,
        mut stop: impl FnMut(&Commit) -> bool,
    ) -> Result<Vec<Commit>> {
        let mut path = Vec::new();
        let mut next = Some(start);
        while let Some(oid) = next {
            let commit = self.repo.get_commit(oid)?;
            self.charge(1)?;
            let done = stop(&commit);
            next = commit.first_parent();
            path.push(commit);
            if done {
                break;
            }
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    #[test]
    fn test_distance_linear_history() {
        let mut repo = MockRepository::new();
        let a = repo.commit("a");
        repo.commit("b");
        let c = repo.commit("c");

        let graph = CommitGraph::new(&repo, None);
        assert_eq!(graph.distance(Some(a), c).unwrap(), 2);
        assert_eq!(graph.distance(None, c).unwrap(), 3);
        assert_eq!(graph.distance(Some(c), c).unwrap(), 0);
    }

    #[test]
    fn test_distance_counts_merged_commits() {
        let mut repo = MockRepository::new();
        let a = repo.commit("a");
        repo.branch("feature/x");
        repo.commit("x1");
        repo.commit("x2");
        repo.checkout("main").unwrap();
        repo.commit("b");
        let merge = repo.merge("feature/x").unwrap();

        let graph = CommitGraph::new(&repo, None);
        // x1, x2, b and the merge
        assert_eq!(graph.distance(Some(a), merge).unwrap(), 4);
    }

    #[test]
    fn test_height_grows_by_one_per_commit() {
        let mut repo = MockRepository::new();
        let a = repo.commit("a");
        let mut previous = 0;
        for i in 0..5 {
            let tip = repo.commit(&format!("c{}", i));
            let graph = CommitGraph::new(&repo, None);
            let height = graph.distance(Some(a), tip).unwrap();
            assert_eq!(height, previous + 1);
            previous = height;
        }
    }

    #[test]
    fn test_ancestor_sets_are_memoized() {
        let mut repo = MockRepository::new();
        repo.commit("a");
        let b = repo.commit("b");
        let graph = CommitGraph::new(&repo, None);

        let first = graph.ancestors(b).unwrap();
        let steps = graph.steps();
        let second = graph.ancestors(b).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(graph.steps(), steps);
    }

    #[test]
    fn test_step_budget_is_fatal() {
        let mut repo = MockRepository::new();
        for i in 0..10 {
            repo.commit(&format!("c{}", i));
        }
        let tip = repo.head_commit().unwrap();
        let graph = CommitGraph::new(&repo, Some(5));

        let err = graph.distance(None, tip).unwrap_err();
        assert!(matches!(err, GitSemverError::StepBudgetExceeded { budget: 5 }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_missing_parent_is_a_boundary() {
        let mut repo = MockRepository::new();
        let a = repo.commit("a");
        repo.commit("b");
        let c = repo.commit("c");
        repo.remove_commit(a);

        let graph = CommitGraph::new(&repo, None);
        assert_eq!(graph.distance(None, c).unwrap(), 2);
    }

    #[test]
    fn test_first_parent_path_stops() {
        let mut repo = MockRepository::new();
        let a = repo.commit("a");
        let b = repo.commit("b");
        let c = repo.commit("c");

        let graph = CommitGraph::new(&repo, None);
        let path = graph.first_parent_path(c, |commit| commit.id == b).unwrap();
        let ids: Vec<Oid> = path.iter().map(|commit| commit.id).collect();
        assert_eq!(ids, vec![c, b]);
        let full = graph.first_parent_path(c, |_| false).unwrap();
        assert_eq!(full.last().map(|commit| commit.id), Some(a));
    }
}
