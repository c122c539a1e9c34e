use crate::domain::{CommitId, SemanticVersion};
use regex::Regex;

/// Represents a git tag and the commit it resolves to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    pub name: String,
    pub commit: CommitId,
}

impl Tag {
    /// Create a new tag
    pub fn new(name: impl Into<String>, commit: impl Into<CommitId>) -> Self {
        Tag {
            name: name.into(),
            commit: commit.into(),
        }
    }

    /// Classify the tag name
    pub fn kind(&self) -> TagKind {
        TagKind::classify(&self.name)
    }
}

/// What a tag name means to the release workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Immutable full version tag, `vX.Y.Z`
    Version(SemanticVersion),
    /// Mutable alias for the newest release of a major line, `vX`
    MajorAlias(u64),
    /// Anything else; ignored by the engine
    Other,
}

impl TagKind {
    /// Classify a tag name as a version, a major alias, or neither
    pub fn classify(name: &str) -> Self {
        if let Ok(version) = SemanticVersion::parse_tag(name) {
            return TagKind::Version(version);
        }

        match Regex::new(r"^v(0|[1-9]\d*)$")
            .ok()
            .and_then(|re| re.captures(name))
            .and_then(|captures| captures.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
        {
            Some(major) => TagKind::MajorAlias(major),
            None => TagKind::Other,
        }
    }
}

/// Name of the alias tag for a major line, e.g. `v2`
pub fn major_alias_name(major: u64) -> String {
    format!("v{}", major)
}
