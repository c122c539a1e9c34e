//! Git operations abstraction layer
//!
//! The version engine never talks to git directly. Everything it needs is
//! read through the [Repository] trait into a
//! [RepositorySnapshot](crate::domain::RepositorySnapshot), and the release
//! step writes back through the same trait.
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory commit graph for tests and fixtures
//!
//! ```rust
//! # use git_bump::git::{MockRepository, Repository};
//! let mut repo = MockRepository::new();
//! repo.add_commit("c1", &[]);
//! repo.set_branch_head("main", "c1");
//! let reachable = repo.commits_reachable_from("main").unwrap();
//! assert_eq!(reachable.len(), 1);
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::domain::{Branch, CommitId, Tag};
use crate::error::Result;

/// Read queries and ref mutations needed by the release workflow
///
/// Read methods back [RepositorySnapshot::capture](crate::domain::RepositorySnapshot::capture);
/// mutating methods are only called by the release applier.
///
/// Implementations map their underlying failures (such as `git2::Error`) to
/// [crate::error::GitBumpError] variants.
pub trait Repository {
    /// All tags, each resolved to the commit it ultimately points at.
    ///
    /// Annotated tags are peeled to their target commit. Tags that do not
    /// resolve to a commit are skipped.
    fn list_tags(&self) -> Result<Vec<Tag>>;

    /// All local branches with their tip commits
    fn list_branches(&self) -> Result<Vec<Branch>>;

    /// Every commit reachable from the tip of `branch`, tip first.
    ///
    /// # Returns
    /// * `Ok(Vec<CommitId>)` - Reachable commits, including the tip
    /// * `Err` - If the branch doesn't exist or the history cannot be walked
    fn commits_reachable_from(&self, branch: &str) -> Result<Vec<CommitId>>;

    /// The checked-out branch, or `None` when HEAD is detached or unborn
    fn current_branch(&self) -> Result<Option<String>>;

    /// Create a lightweight tag. Fails if the tag already exists.
    fn create_tag(&mut self, name: &str, commit: &CommitId) -> Result<()>;

    /// Create or overwrite a lightweight tag
    fn force_move_tag(&mut self, name: &str, commit: &CommitId) -> Result<()>;

    /// Delete a tag. Fails if the tag doesn't exist.
    fn delete_tag(&mut self, name: &str) -> Result<()>;

    /// Create a local branch. Fails if the branch already exists.
    fn create_branch(&mut self, name: &str, commit: &CommitId) -> Result<()>;

    /// Fetch all branches and tags from a remote
    fn fetch_from_remote(&self, remote: &str) -> Result<()>;

    /// Push refspecs to a remote, e.g. `refs/tags/v1.2.0:refs/tags/v1.2.0`
    /// or `+refs/tags/v1:refs/tags/v1` for a forced alias update.
    fn push_refs(&self, remote: &str, refspecs: &[String]) -> Result<()>;
}
