//! Commit graph access layer
//!
//! This module provides a trait-based abstraction over the read-only git
//! queries the version calculation needs, allowing for multiple
//! implementations including real git repositories and in-memory graphs for
//! testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations are:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory commit graph for testing
//!
//! # Usage
//!
//! The calculation engine only depends on the [Repository] trait.
//!
//! ```rust
//! # use git_semver::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> git_semver::Result<()> {
//! let head = repo.head()?;
//! let history = repo.commits_between(None, head.commit)?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::domain::{Branch, Commit};
use crate::error::Result;
use git2::Oid;

/// A tag reference, peeled to the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub name: String,
    pub target: Oid,
}

/// What HEAD points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Head {
    /// Checked-out branch, None when detached
    pub branch: Option<String>,
    pub commit: Oid,
}

/// Read-only commit graph queries
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Missing objects (shallow
/// clones, pruned history) must be reported as
/// [GraphTraversal](crate::error::GitSemverError::GraphTraversal) so the
/// engine can degrade instead of aborting.
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): Real git implementation using the `git2` crate
/// - [MockRepository](mock::MockRepository): In-memory DAG built by test fixtures
pub trait Repository {
    /// Get the current HEAD
    ///
    /// # Returns
    /// * `Ok(Head)` - Checked-out branch (if any) and commit
    /// * `Err` - If HEAD is unborn or cannot be read
    fn head(&self) -> Result<Head>;

    /// List local branches and their tips
    ///
    /// Returns branches sorted by name.
    fn list_branches(&self) -> Result<Vec<Branch>>;

    /// List all tags, peeled to commits
    ///
    /// Tags that do not point at a commit are skipped.
    fn list_tags(&self) -> Result<Vec<TagRef>>;

    /// Read a single commit
    ///
    /// # Arguments
    /// * `oid` - Object ID of the commit
    ///
    /// # Returns
    /// * `Ok(Commit)` - Parents, message and timestamps
    /// * `Err(GraphTraversal)` - If the commit is not in the object store
    fn get_commit(&self, oid: Oid) -> Result<Commit>;

    /// Whether `ancestor` is reachable from `descendant`
    ///
    /// A commit counts as its own ancestor.
    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool>;

    /// Best common ancestor of two commits
    ///
    /// # Returns
    /// * `Ok(Some(Oid))` - The merge base
    /// * `Ok(None)` - If the histories are unrelated
    fn merge_base(&self, a: Oid, b: Oid) -> Result<Option<Oid>>;

    /// Get commits between two OIDs
    ///
    /// Returns commits reachable from `to` (inclusive) but not from `from`
    /// (exclusive), parents before children. `None` for `from` means the start
    /// of history.
    ///
    /// # Example
    /// ```rust
    /// # use git_semver::git::Repository;
    /// # use git2::Oid;
    /// # fn example<R: Repository>(repo: &R, tag: Oid, head: Oid) -> git_semver::Result<()> {
    /// for commit in repo.commits_between(Some(tag), head)? {
    ///     println!("{}: {}", commit.id, commit.summary());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn commits_between(&self, from: Option<Oid>, to: Oid) -> Result<Vec<Commit>>;

    /// Number of files with uncommitted changes in the working tree
    fn uncommitted_file_count(&self) -> Result<usize>;
}
