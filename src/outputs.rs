//! Named workflow outputs consumed by CI callers.
//!
//! Keys and value formats are fixed for compatibility with existing
//! workflows: every value is a string, booleans are `"true"`/`"false"`.

use crate::engine::BumpResult;
use crate::error::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub const NEW_VERSION: &str = "NEW_VERSION";
pub const FIRST_RELEASE: &str = "FIRST_RELEASE";
pub const CURRENT_MAJOR: &str = "CURRENT_MAJOR";
pub const MAJOR_VERSION: &str = "MAJOR_VERSION";

/// Environment variable naming the file GitHub Actions collects outputs from
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Ordered key/value outputs of a bump or release command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowOutputs {
    entries: Vec<(&'static str, String)>,
}

impl WorkflowOutputs {
    /// Outputs of the bump command: `NEW_VERSION`, `FIRST_RELEASE`, `CURRENT_MAJOR`
    pub fn for_bump(result: &BumpResult) -> Self {
        WorkflowOutputs {
            entries: vec![
                (NEW_VERSION, result.new_version.to_string()),
                (FIRST_RELEASE, result.first_release.to_string()),
                (CURRENT_MAJOR, result.current_major().to_string()),
            ],
        }
    }

    /// Outputs of the release command: the bump outputs plus `MAJOR_VERSION`
    pub fn for_release(result: &BumpResult, major_version: &str) -> Self {
        let mut outputs = Self::for_bump(result);
        outputs
            .entries
            .push((MAJOR_VERSION, major_version.to_string()));
        outputs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> &[(&'static str, String)] {
        &self.entries
    }

    /// `KEY=value` lines, one per output
    pub fn to_lines(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}\n", k, v))
            .collect()
    }

    /// Append the outputs to a GitHub Actions output file
    pub fn append_to(&self, path: &Path) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(self.to_lines().as_bytes())?;
        Ok(())
    }

    /// Append to `$GITHUB_OUTPUT` when it is set; returns whether anything was written
    pub fn append_to_github_output(&self) -> Result<bool> {
        match std::env::var_os(GITHUB_OUTPUT_ENV) {
            Some(path) if !path.is_empty() => {
                self.append_to(Path::new(&path))?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BumpType, Branch, CommitId, RepositorySnapshot, Tag};
    use crate::engine::{BumpRequest, VersionEngine};

    fn result(tags: Vec<Tag>, bump: BumpType) -> BumpResult {
        let snapshot = RepositorySnapshot::new(tags, vec![Branch::new("main", "c2")], None)
            .with_reachable("main", ["c2", "c1"].map(CommitId::from));
        VersionEngine::default()
            .compute(&snapshot, &BumpRequest::new(bump, "main"))
            .unwrap()
    }

    #[test]
    fn test_first_release_outputs() {
        let outputs = WorkflowOutputs::for_bump(&result(vec![], BumpType::Minor));
        assert_eq!(
            outputs.to_lines(),
            "NEW_VERSION=v0.1.0\nFIRST_RELEASE=true\nCURRENT_MAJOR=0\n"
        );
    }

    #[test]
    fn test_release_outputs() {
        let result = result(
            vec![Tag::new("v1.2.0", "c1"), Tag::new("v1", "c1")],
            BumpType::Major,
        );
        let outputs = WorkflowOutputs::for_release(&result, "v2");
        assert_eq!(outputs.get(NEW_VERSION), Some("v2.0.0"));
        assert_eq!(outputs.get(FIRST_RELEASE), Some("false"));
        assert_eq!(outputs.get(CURRENT_MAJOR), Some("1"));
        assert_eq!(outputs.get(MAJOR_VERSION), Some("v2"));
        assert_eq!(outputs.entries().len(), 4);
    }

    #[test]
    fn test_append_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("output");
        std::fs::write(&path, "EXISTING=1\n").unwrap();

        let outputs = WorkflowOutputs::for_bump(&result(vec![], BumpType::Patch));
        outputs.append_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("EXISTING=1\n"));
        assert!(content.contains("NEW_VERSION=v0.0.1\n"));
    }
}
