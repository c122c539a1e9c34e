//! Domain logic - pure release rules independent of git operations

pub mod branch;
pub mod snapshot;
pub mod tag;
pub mod version;

pub use branch::{release_branch_name, Branch, BranchKind};
pub use snapshot::{short_hash, CommitId, LineState, RepositorySnapshot};
pub use tag::{major_alias_name, Tag, TagKind};
pub use version::{BumpType, SemanticVersion};
