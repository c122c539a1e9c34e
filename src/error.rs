use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Failures detected by the version engine before any ref is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid target branch '{branch}': expected '{main}' or 'release/vN'")]
    InvalidBranchFormat { branch: String, main: String },

    #[error("Branch '{0}' does not exist")]
    BranchNotFound(String),

    #[error("No version tags exist yet; the first release must be made from '{main}', not '{branch}'")]
    FirstReleaseMustBeMain { branch: String, main: String },

    #[error("Major bumps are not allowed on release branch '{0}'")]
    MajorBumpNotAllowedOnReleaseBranch(String),

    #[error("Ambiguous tag state: {0}")]
    DuplicateOrAmbiguousTag(String),

    #[error("Release branch '{branch}' is fixed to major {expected}, but {found}")]
    MajorVersionMismatch {
        branch: String,
        expected: u64,
        found: String,
    },

    #[error("No version tag is reachable from '{0}' although version tags exist")]
    NoReachableVersion(String),

    #[error("Cannot apply a {bump} bump to {version}: the component would overflow")]
    VersionOverflow { version: String, bump: String },
}

/// Stable discriminant for [`EngineError`], used to match failures in fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ErrorKind {
    InvalidBranchFormat,
    BranchNotFound,
    FirstReleaseMustBeMain,
    MajorBumpNotAllowedOnReleaseBranch,
    DuplicateOrAmbiguousTag,
    MajorVersionMismatch,
    NoReachableVersion,
    VersionOverflow,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidBranchFormat { .. } => ErrorKind::InvalidBranchFormat,
            EngineError::BranchNotFound(_) => ErrorKind::BranchNotFound,
            EngineError::FirstReleaseMustBeMain { .. } => ErrorKind::FirstReleaseMustBeMain,
            EngineError::MajorBumpNotAllowedOnReleaseBranch(_) => {
                ErrorKind::MajorBumpNotAllowedOnReleaseBranch
            }
            EngineError::DuplicateOrAmbiguousTag(_) => ErrorKind::DuplicateOrAmbiguousTag,
            EngineError::MajorVersionMismatch { .. } => ErrorKind::MajorVersionMismatch,
            EngineError::NoReachableVersion(_) => ErrorKind::NoReachableVersion,
            EngineError::VersionOverflow { .. } => ErrorKind::VersionOverflow,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Unified error type for git-bump operations
#[derive(Error, Debug)]
pub enum GitBumpError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Branch error: {0}")]
    Branch(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in git-bump
pub type Result<T> = std::result::Result<T, GitBumpError>;

impl GitBumpError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitBumpError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        GitBumpError::Version(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        GitBumpError::Tag(msg.into())
    }

    /// Create a branch error with context
    pub fn branch(msg: impl Into<String>) -> Self {
        GitBumpError::Branch(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        GitBumpError::Remote(msg.into())
    }

    /// Create a fixture error with context
    pub fn fixture(msg: impl Into<String>) -> Self {
        GitBumpError::Fixture(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GitBumpError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GitBumpError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_engine_error_is_transparent() {
        let err: GitBumpError = EngineError::BranchNotFound("release/v3".to_string()).into();
        assert_eq!(err.to_string(), "Branch 'release/v3' does not exist");
    }

    #[test]
    fn test_engine_error_messages_name_the_branch() {
        let err = EngineError::InvalidBranchFormat {
            branch: "feature/x".to_string(),
            main: "main".to_string(),
        };
        assert!(err.to_string().contains("feature/x"));
        assert!(err.to_string().contains("release/vN"));

        let err = EngineError::MajorVersionMismatch {
            branch: "release/v1".to_string(),
            expected: 1,
            found: "latest reachable version is v2.0.0".to_string(),
        };
        assert!(err.to_string().contains("fixed to major 1"));
    }

    #[test]
    fn test_engine_error_kinds() {
        let pairs = vec![
            (
                EngineError::MajorBumpNotAllowedOnReleaseBranch("release/v1".to_string()),
                ErrorKind::MajorBumpNotAllowedOnReleaseBranch,
            ),
            (
                EngineError::DuplicateOrAmbiguousTag("x".to_string()),
                ErrorKind::DuplicateOrAmbiguousTag,
            ),
            (
                EngineError::NoReachableVersion("main".to_string()),
                ErrorKind::NoReachableVersion,
            ),
            (
                EngineError::VersionOverflow {
                    version: "v1.2.18446744073709551615".to_string(),
                    bump: "patch".to_string(),
                },
                ErrorKind::VersionOverflow,
            ),
        ];

        for (err, kind) in pairs {
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    fn test_error_kind_deserializes_by_name() {
        let kind: ErrorKind = serde_json::from_str("\"FirstReleaseMustBeMain\"").unwrap();
        assert_eq!(kind, ErrorKind::FirstReleaseMustBeMain);
        assert!(serde_json::from_str::<ErrorKind>("\"SomethingElse\"").is_err());
        assert_eq!(kind.to_string(), "FirstReleaseMustBeMain");
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (GitBumpError::config("x"), "Configuration error"),
            (GitBumpError::version("x"), "Version parsing error"),
            (GitBumpError::tag("x"), "Tag error"),
            (GitBumpError::branch("x"), "Branch error"),
            (GitBumpError::remote("x"), "Remote operation failed"),
            (GitBumpError::fixture("x"), "Fixture error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
