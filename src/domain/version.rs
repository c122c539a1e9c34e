use crate::error::{GitBumpError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic version representation
///
/// Ordered componentwise (major, then minor, then patch). Always rendered
/// with the `v` prefix used by full version tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemanticVersion {
    /// The base every first release is bumped from.
    pub const INITIAL: SemanticVersion = SemanticVersion::new(0, 0, 0);

    /// Create a new version
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
        }
    }

    /// Parse a full version tag such as `v1.2.3`.
    ///
    /// The `v` prefix is required and exactly three numeric components must
    /// follow. Pre-release and build suffixes are rejected: `v1.2.3-rc.1` is
    /// not a full version tag in this workflow.
    pub fn parse_tag(tag: &str) -> Result<Self> {
        let number = tag.strip_prefix('v').ok_or_else(|| {
            GitBumpError::version(format!("Invalid version tag: '{}' - expected vX.Y.Z", tag))
        })?;

        let parsed = semver::Version::parse(number).map_err(|e| {
            GitBumpError::version(format!("Invalid version tag: '{}' - {}", tag, e))
        })?;

        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(GitBumpError::version(format!(
                "Invalid version tag: '{}' - pre-release and build metadata are not release versions",
                tag
            )));
        }

        Ok(SemanticVersion::new(parsed.major, parsed.minor, parsed.patch))
    }

    /// Bump version according to bump type.
    ///
    /// A major bump out of the 0.x line is a promotion and always lands on
    /// 1.0.0 regardless of the previous minor and patch. Returns `None` when
    /// the bumped component does not fit in a `u64`.
    pub fn bump(&self, bump_type: BumpType) -> Option<Self> {
        match bump_type {
            BumpType::Major if self.major == 0 => Some(SemanticVersion::new(1, 0, 0)),
            BumpType::Major => Some(SemanticVersion::new(self.major.checked_add(1)?, 0, 0)),
            BumpType::Minor => Some(SemanticVersion::new(self.major, self.minor.checked_add(1)?, 0)),
            BumpType::Patch => Some(SemanticVersion::new(
                self.major,
                self.minor,
                self.patch.checked_add(1)?,
            )),
        }
    }

    /// Whether a major bump from this version is the 0.x -> 1.0.0 promotion.
    pub fn is_promotion(&self, bump_type: BumpType) -> bool {
        bump_type == BumpType::Major && self.major == 0
    }

    /// Name of the full version tag, e.g. `v1.2.3`.
    pub fn tag_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemanticVersion {
    type Err = GitBumpError;

    fn from_str(s: &str) -> Result<Self> {
        SemanticVersion::parse_tag(s)
    }
}

/// Version bump type requested by the caller
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    Major,
    Minor,
    Patch,
}

impl FromStr for BumpType {
    type Err = GitBumpError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "major" => Ok(BumpType::Major),
            "minor" => Ok(BumpType::Minor),
            "patch" => Ok(BumpType::Patch),
            other => Err(GitBumpError::version(format!(
                "Invalid bump type: '{}' - expected major, minor or patch",
                other
            ))),
        }
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpType::Major => write!(f, "major"),
            BumpType::Minor => write!(f, "minor"),
            BumpType::Patch => write!(f, "patch"),
        }
    }
}
