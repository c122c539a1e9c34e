use crate::domain::BumpType;
use crate::error::{ErrorKind, GitBumpError, Result};
use crate::git::MockRepository;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

/// A release scenario: a repository, one bump request, and the checks the
/// outcome must satisfy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub repository: RepositoryFixture,
    pub request: RequestFixture,
    #[serde(default)]
    pub checks: Vec<Check>,
}

fn default_main_branch() -> String {
    "main".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryFixture {
    #[serde(default = "default_main_branch")]
    pub main_branch: String,
    #[serde(default)]
    pub commits: Vec<CommitFixture>,
    /// Branch name -> tip commit id
    #[serde(default)]
    pub branches: BTreeMap<String, String>,
    /// Tag name -> commit id
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub current_branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitFixture {
    pub id: String,
    #[serde(default)]
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestFixture {
    pub bump_type: BumpType,
    pub target_branch: String,
}

/// Output keys a check may inspect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputKey {
    NewVersion,
    FirstRelease,
    CurrentMajor,
    MajorVersion,
}

impl OutputKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKey::NewVersion => crate::outputs::NEW_VERSION,
            OutputKey::FirstRelease => crate::outputs::FIRST_RELEASE,
            OutputKey::CurrentMajor => crate::outputs::CURRENT_MAJOR,
            OutputKey::MajorVersion => crate::outputs::MAJOR_VERSION,
        }
    }
}

/// One expectation about a scenario's outcome.
///
/// Tag and alias checks look at the repository after the release has been
/// applied.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Check {
    /// The computed version, e.g. `v1.0.0`
    NewVersion { expected: String },
    FirstRelease { expected: bool },
    /// The release branch to cut (`null` for none), optionally at the
    /// commit of a given tag
    ReleaseBranch {
        expected: Option<String>,
        #[serde(default)]
        at: Option<String>,
    },
    /// Alias `tag` resolves to the same commit as tag `expected`
    Alias { tag: String, expected: String },
    /// Tag `tag` points at commit `commit`
    TagTarget { tag: String, commit: String },
    Output { key: OutputKey, expected: String },
    /// The bump fails with this error
    Error { expected: ErrorKind },
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::NewVersion { expected } => write!(f, "new version is {}", expected),
            Check::FirstRelease { expected } => write!(f, "first release is {}", expected),
            Check::ReleaseBranch { expected, at } => match (expected, at) {
                (Some(branch), Some(at)) => write!(f, "release branch {} at {}", branch, at),
                (Some(branch), None) => write!(f, "release branch {}", branch),
                (None, _) => write!(f, "no release branch"),
            },
            Check::Alias { tag, expected } => write!(f, "alias {} resolves to {}", tag, expected),
            Check::TagTarget { tag, commit } => write!(f, "tag {} points at {}", tag, commit),
            Check::Output { key, expected } => write!(f, "{}={}", key.as_str(), expected),
            Check::Error { expected } => write!(f, "fails with {}", expected),
        }
    }
}

impl Scenario {
    /// Parse a scenario document. Unknown fields, bump types and check kinds
    /// are rejected.
    pub fn from_json(content: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(content)?;
        scenario.repository.validate()?;
        Ok(scenario)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GitBumpError::fixture(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content).map_err(|e| {
            GitBumpError::fixture(format!("Invalid scenario '{}': {}", path.display(), e))
        })
    }
}

impl RepositoryFixture {
    fn validate(&self) -> Result<()> {
        let mut ids = BTreeSet::new();
        for commit in &self.commits {
            if !ids.insert(commit.id.as_str()) {
                return Err(GitBumpError::fixture(format!(
                    "Commit '{}' is declared twice",
                    commit.id
                )));
            }
        }

        for commit in &self.commits {
            for parent in &commit.parents {
                if !ids.contains(parent.as_str()) {
                    return Err(GitBumpError::fixture(format!(
                        "Commit '{}' has unknown parent '{}'",
                        commit.id, parent
                    )));
                }
            }
        }

        let refs = self
            .branches
            .iter()
            .map(|(name, commit)| ("branch", name, commit))
            .chain(self.tags.iter().map(|(name, commit)| ("tag", name, commit)));
        for (kind, name, commit) in refs {
            if !ids.contains(commit.as_str()) {
                return Err(GitBumpError::fixture(format!(
                    "{} '{}' points at unknown commit '{}'",
                    kind, name, commit
                )));
            }
        }

        if let Some(current) = &self.current_branch {
            if !self.branches.contains_key(current) {
                return Err(GitBumpError::fixture(format!(
                    "Current branch '{}' is not declared",
                    current
                )));
            }
        }

        Ok(())
    }

    /// Build the in-memory repository this fixture describes
    pub fn build(&self) -> MockRepository {
        let mut repo = MockRepository::new();
        for commit in &self.commits {
            let parents: Vec<&str> = commit.parents.iter().map(|p| p.as_str()).collect();
            repo.add_commit(&commit.id, &parents);
        }
        for (name, commit) in &self.branches {
            repo.set_branch_head(name.clone(), commit);
        }
        for (name, commit) in &self.tags {
            repo.add_tag(name.clone(), commit);
        }
        if let Some(current) = &self.current_branch {
            repo.checkout(current.clone());
        }
        repo
    }
}
