//! Version state engine: decides the next release from a repository snapshot

pub mod version_engine;

pub use version_engine::{unparsable_tag_warnings, VersionEngine};

use crate::boundary::BoundaryWarning;
use crate::domain::{BumpType, CommitId, SemanticVersion};

/// A single bump instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpRequest {
    pub bump_type: BumpType,
    pub target_branch: String,
}

impl BumpRequest {
    pub fn new(bump_type: BumpType, target_branch: impl Into<String>) -> Self {
        BumpRequest {
            bump_type,
            target_branch: target_branch.into(),
        }
    }
}

/// Where the major alias tag must point after the release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasMove {
    /// Alias tag name, e.g. `v1`
    pub name: String,
    pub target: SemanticVersion,
    pub commit: CommitId,
    /// Commit the alias points to today; `None` if it will be created
    pub previous_commit: Option<CommitId>,
}

impl AliasMove {
    /// Whether applying the move would change anything
    pub fn is_noop(&self) -> bool {
        self.previous_commit.as_ref() == Some(&self.commit)
    }
}

/// A maintenance branch to cut for the superseded major line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBranchPlan {
    /// Branch name, e.g. `release/v1`
    pub name: String,
    /// Commit of the newest release of the superseded line
    pub commit: CommitId,
    pub from_version: SemanticVersion,
}

/// Everything the release step needs to move refs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpResult {
    pub new_version: SemanticVersion,
    pub target_branch: String,
    /// Commit the new version tag will point at (the target branch tip)
    pub target_commit: CommitId,
    pub previous_version: Option<SemanticVersion>,
    pub major_alias: AliasMove,
    pub release_branch_to_create: Option<ReleaseBranchPlan>,
    pub first_release: bool,
    pub warnings: Vec<BoundaryWarning>,
}

impl BumpResult {
    /// Name of the full version tag to create
    pub fn new_tag(&self) -> String {
        self.new_version.tag_name()
    }

    /// Major of the version being bumped from; 0 before the first release
    pub fn current_major(&self) -> u64 {
        self.previous_version.map(|v| v.major).unwrap_or(0)
    }
}
