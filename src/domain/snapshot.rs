//! Immutable view of a repository's refs, the version engine's only input.

use crate::domain::{Branch, BranchKind, SemanticVersion, Tag, TagKind};
use crate::error::Result;
use crate::git::Repository;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// Commit identifier (full hex object id for real repositories)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        CommitId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First seven characters, for display
    pub fn short(&self) -> &str {
        short_hash(&self.0)
    }
}

/// First seven characters of a commit id, cut on a char boundary
pub fn short_hash(id: &str) -> &str {
    match id.char_indices().nth(7) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitId {
    fn from(id: &str) -> Self {
        CommitId(id.to_string())
    }
}

impl From<String> for CommitId {
    fn from(id: String) -> Self {
        CommitId(id)
    }
}

impl From<git2::Oid> for CommitId {
    fn from(oid: git2::Oid) -> Self {
        CommitId(oid.to_string())
    }
}

/// Where the repository sits in the release lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    /// No full version tag exists yet
    NoReleases,
    /// The highest major line with at least one release
    StableLine(u64),
}

impl fmt::Display for LineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineState::NoReleases => write!(f, "no releases"),
            LineState::StableLine(major) => write!(f, "v{} line", major),
        }
    }
}

/// Tags, branches and per-branch reachability captured at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySnapshot {
    tags: Vec<Tag>,
    branches: Vec<Branch>,
    current_branch: Option<String>,
    reachable: BTreeMap<String, BTreeSet<CommitId>>,
}

impl RepositorySnapshot {
    /// Build a snapshot from already-collected refs.
    ///
    /// Tags and branches are kept sorted by name so that two snapshots of
    /// the same repository compare equal regardless of listing order.
    pub fn new(mut tags: Vec<Tag>, mut branches: Vec<Branch>, current_branch: Option<String>) -> Self {
        tags.sort();
        branches.sort();
        RepositorySnapshot {
            tags,
            branches,
            current_branch,
            reachable: BTreeMap::new(),
        }
    }

    /// Record the commits reachable from a branch tip
    pub fn with_reachable<I>(mut self, branch: impl Into<String>, commits: I) -> Self
    where
        I: IntoIterator<Item = CommitId>,
    {
        self.reachable
            .insert(branch.into(), commits.into_iter().collect());
        self
    }

    /// Read tags, branches and reachability from a repository.
    ///
    /// Reachability is collected for the main branch, every `release/vN`
    /// branch and `target` when it names an existing branch.
    pub fn capture<R: Repository + ?Sized>(
        repo: &R,
        main_branch: &str,
        target: Option<&str>,
    ) -> Result<Self> {
        let tags = repo.list_tags()?;
        let branches = repo.list_branches()?;
        let current_branch = repo.current_branch()?;

        debug!(
            tags = tags.len(),
            branches = branches.len(),
            current = current_branch.as_deref().unwrap_or("(detached)"),
            "capturing repository snapshot"
        );

        let wanted: Vec<String> = branches
            .iter()
            .filter(|b| {
                BranchKind::classify(&b.name, main_branch).is_some()
                    || Some(b.name.as_str()) == target
            })
            .map(|b| b.name.clone())
            .collect();

        let mut snapshot = RepositorySnapshot::new(tags, branches, current_branch);
        for name in wanted {
            let commits = repo.commits_reachable_from(&name)?;
            debug!(branch = %name, commits = commits.len(), "collected reachable commits");
            snapshot = snapshot.with_reachable(name, commits);
        }

        Ok(snapshot)
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn current_branch(&self) -> Option<&str> {
        self.current_branch.as_deref()
    }

    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }

    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.name == name)
    }

    /// Commits reachable from a branch tip, if collected
    pub fn reachable_from(&self, branch: &str) -> Option<&BTreeSet<CommitId>> {
        self.reachable.get(branch)
    }

    /// All full version tags with their parsed versions, in tag name order
    pub fn version_tags(&self) -> Vec<(SemanticVersion, &Tag)> {
        self.tags
            .iter()
            .filter_map(|tag| match tag.kind() {
                TagKind::Version(version) => Some((version, tag)),
                _ => None,
            })
            .collect()
    }

    /// All major alias tags, in tag name order
    pub fn major_aliases(&self) -> Vec<(u64, &Tag)> {
        self.tags
            .iter()
            .filter_map(|tag| match tag.kind() {
                TagKind::MajorAlias(major) => Some((major, tag)),
                _ => None,
            })
            .collect()
    }

    /// Tags that are neither version tags nor major aliases
    pub fn other_tags(&self) -> Vec<&Tag> {
        self.tags
            .iter()
            .filter(|tag| tag.kind() == TagKind::Other)
            .collect()
    }

    /// `release/vN` branches with their major, in name order
    pub fn release_branches(&self, main_branch: &str) -> Vec<(u64, &Branch)> {
        self.branches
            .iter()
            .filter_map(|b| match BranchKind::classify(&b.name, main_branch) {
                Some(BranchKind::Release(major)) => Some((major, b)),
                _ => None,
            })
            .collect()
    }

    /// Highest version tagged anywhere in the repository
    pub fn highest_version(&self) -> Option<SemanticVersion> {
        self.version_tags().into_iter().map(|(v, _)| v).max()
    }

    /// State-machine view of the snapshot
    pub fn line_state(&self) -> LineState {
        match self.highest_version() {
            Some(version) => LineState::StableLine(version.major),
            None => LineState::NoReleases,
        }
    }
}
