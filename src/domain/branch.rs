use crate::domain::CommitId;
use regex::Regex;

/// A branch name and the commit at its tip
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Branch {
    pub name: String,
    pub commit: CommitId,
}

impl Branch {
    pub fn new(name: impl Into<String>, commit: impl Into<CommitId>) -> Self {
        Branch {
            name: name.into(),
            commit: commit.into(),
        }
    }
}

/// Role a branch plays in the release workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    /// The branch tracking the highest major under development
    Main,
    /// `release/vN`, maintaining a superseded major line
    Release(u64),
}

impl BranchKind {
    /// Classify a branch name, given the configured main branch name.
    ///
    /// Returns `None` for anything that is neither the main branch nor a
    /// `release/vN` branch. `N` is written the way [`release_branch_name`]
    /// writes it: no leading zeros, and small enough for a `u64` major.
    pub fn classify(name: &str, main_branch: &str) -> Option<Self> {
        if name == main_branch {
            return Some(BranchKind::Main);
        }

        Regex::new(r"^release/v(0|[1-9][0-9]*)$")
            .ok()
            .and_then(|re| re.captures(name))
            .and_then(|captures| captures.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .map(BranchKind::Release)
    }

    pub fn is_main(&self) -> bool {
        matches!(self, BranchKind::Main)
    }
}

/// Name of the maintenance branch for a major line, e.g. `release/v1`
pub fn release_branch_name(major: u64) -> String {
    format!("release/v{}", major)
}
