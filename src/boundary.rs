use crate::domain::short_hash;
use std::fmt;

/// Non-fatal conditions noticed while computing or applying a release.
/// These are reported to the user but do not stop the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryWarning {
    /// The target branch tip already carries the latest version tag
    NoNewCommits {
        latest_tag: String,
        current_commit_hash: String,
    },
    /// Tag looks like a version but cannot be parsed as `vX.Y.Z`
    UnparsableTag { tag: String, reason: String },
    /// The release branch for the superseded major already exists
    ReleaseBranchExists { branch: String },
    /// The major alias does not exist yet and will be created
    AliasMissing { alias: String },
    /// Fetch operation failed due to authentication issues
    FetchAuthenticationFailed { remote: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoNewCommits {
                latest_tag,
                current_commit_hash,
            } => write!(
                f,
                "No new commits since tag '{}' (current: {})",
                latest_tag,
                short_hash(current_commit_hash)
            ),
            BoundaryWarning::UnparsableTag { tag, reason } => {
                write!(f, "Cannot parse tag '{}': {}", tag, reason)
            }
            BoundaryWarning::ReleaseBranchExists { branch } => {
                write!(f, "Release branch '{}' already exists; leaving it as is", branch)
            }
            BoundaryWarning::AliasMissing { alias } => {
                write!(f, "Major alias '{}' does not exist yet; it will be created", alias)
            }
            BoundaryWarning::FetchAuthenticationFailed { remote } => {
                write!(
                    f,
                    "Authentication failed when fetching from remote '{}'",
                    remote
                )
            }
        }
    }
}
