use crate::domain::{Branch, CommitId, Tag};
use crate::error::{GitBumpError, Result};
use crate::git::Repository;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

/// In-memory repository for tests and scenario fixtures
///
/// Holds a commit graph (each commit lists its parents), tags and branch
/// heads. Mutations behave like their git counterparts, including failing
/// when a tag or branch already exists.
#[derive(Debug, Clone, Default)]
pub struct MockRepository {
    commits: BTreeMap<CommitId, Vec<CommitId>>,
    tags: BTreeMap<String, CommitId>,
    branch_heads: BTreeMap<String, CommitId>,
    head: Option<String>,
    pushed: RefCell<Vec<(String, String)>>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit with its parents
    pub fn add_commit(&mut self, id: &str, parents: &[&str]) {
        self.commits.insert(
            CommitId::from(id),
            parents.iter().map(|p| CommitId::from(*p)).collect(),
        );
    }

    /// Add a chain of commits, each the child of the previous one
    pub fn add_linear_history(&mut self, ids: &[&str]) {
        let mut parent: Option<&str> = None;
        for id in ids {
            match parent {
                Some(p) => self.add_commit(id, &[p]),
                None => self.add_commit(id, &[]),
            }
            parent = Some(id);
        }
    }

    /// Add or overwrite a tag pointing to a commit
    pub fn add_tag(&mut self, name: impl Into<String>, commit: &str) {
        self.tags.insert(name.into(), CommitId::from(commit));
    }

    /// Set a branch head
    pub fn set_branch_head(&mut self, branch: impl Into<String>, commit: &str) {
        self.branch_heads.insert(branch.into(), CommitId::from(commit));
    }

    /// Check out a branch
    pub fn checkout(&mut self, branch: impl Into<String>) {
        self.head = Some(branch.into());
    }

    /// Commit a tag currently points to
    pub fn tag_target(&self, name: &str) -> Option<&CommitId> {
        self.tags.get(name)
    }

    /// Commit a branch head currently points to
    pub fn branch_head(&self, name: &str) -> Option<&CommitId> {
        self.branch_heads.get(name)
    }

    /// Refspecs pushed so far, as `(remote, refspec)` pairs
    pub fn pushed(&self) -> Vec<(String, String)> {
        self.pushed.borrow().clone()
    }

    fn ensure_commit(&self, commit: &CommitId) -> Result<()> {
        if self.commits.contains_key(commit) {
            Ok(())
        } else {
            Err(GitBumpError::tag(format!("Cannot find object: {}", commit)))
        }
    }
}

impl Repository for MockRepository {
    fn list_tags(&self) -> Result<Vec<Tag>> {
        Ok(self
            .tags
            .iter()
            .map(|(name, commit)| Tag::new(name.clone(), commit.clone()))
            .collect())
    }

    fn list_branches(&self) -> Result<Vec<Branch>> {
        Ok(self
            .branch_heads
            .iter()
            .map(|(name, commit)| Branch::new(name.clone(), commit.clone()))
            .collect())
    }

    fn commits_reachable_from(&self, branch: &str) -> Result<Vec<CommitId>> {
        let tip = self
            .branch_heads
            .get(branch)
            .ok_or_else(|| GitBumpError::branch(format!("Branch not found: {}", branch)))?;

        let mut seen = BTreeSet::new();
        let mut order = Vec::new();
        let mut stack = vec![tip.clone()];

        while let Some(commit) = stack.pop() {
            if !seen.insert(commit.clone()) {
                continue;
            }
            if let Some(parents) = self.commits.get(&commit) {
                stack.extend(parents.iter().rev().cloned());
            }
            order.push(commit);
        }

        Ok(order)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.head.clone())
    }

    fn create_tag(&mut self, name: &str, commit: &CommitId) -> Result<()> {
        if self.tags.contains_key(name) {
            return Err(GitBumpError::tag(format!("Tag '{}' already exists", name)));
        }
        self.ensure_commit(commit)?;
        self.tags.insert(name.to_string(), commit.clone());
        Ok(())
    }

    fn force_move_tag(&mut self, name: &str, commit: &CommitId) -> Result<()> {
        self.ensure_commit(commit)?;
        self.tags.insert(name.to_string(), commit.clone());
        Ok(())
    }

    fn delete_tag(&mut self, name: &str) -> Result<()> {
        self.tags
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| GitBumpError::tag(format!("Tag '{}' does not exist", name)))
    }

    fn create_branch(&mut self, name: &str, commit: &CommitId) -> Result<()> {
        if self.branch_heads.contains_key(name) {
            return Err(GitBumpError::branch(format!(
                "Branch '{}' already exists",
                name
            )));
        }
        self.ensure_commit(commit)?;
        self.branch_heads.insert(name.to_string(), commit.clone());
        Ok(())
    }

    fn fetch_from_remote(&self, _remote: &str) -> Result<()> {
        Ok(())
    }

    fn push_refs(&self, remote: &str, refspecs: &[String]) -> Result<()> {
        self.pushed
            .borrow_mut()
            .extend(refspecs.iter().map(|r| (remote.to_string(), r.clone())));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.add_linear_history(&["c1", "c2", "c3"]);
        repo.add_commit("r1", &["c2"]);
        repo.set_branch_head("main", "c3");
        repo.set_branch_head("release/v0", "r1");
        repo
    }

    #[test]
    fn test_reachability_follows_parents() {
        let repo = repo();
        let main = repo.commits_reachable_from("main").unwrap();
        assert_eq!(
            main,
            vec![CommitId::from("c3"), CommitId::from("c2"), CommitId::from("c1")]
        );

        let release = repo.commits_reachable_from("release/v0").unwrap();
        assert!(release.contains(&CommitId::from("r1")));
        assert!(!release.contains(&CommitId::from("c3")));
    }

    #[test]
    fn test_reachability_handles_merges() {
        let mut repo = repo();
        repo.add_commit("m1", &["c3", "r1"]);
        repo.set_branch_head("main", "m1");
        let main = repo.commits_reachable_from("main").unwrap();
        assert_eq!(main.len(), 5);
    }

    #[test]
    fn test_unknown_branch() {
        assert!(repo().commits_reachable_from("nope").is_err());
    }

    #[test]
    fn test_tags() {
        let mut repo = repo();
        repo.create_tag("v1.0.0", &CommitId::from("c3")).unwrap();
        assert!(repo.create_tag("v1.0.0", &CommitId::from("c2")).is_err());
        assert!(repo.create_tag("v2.0.0", &CommitId::from("zz")).is_err());

        repo.force_move_tag("v1", &CommitId::from("c2")).unwrap();
        repo.force_move_tag("v1", &CommitId::from("c3")).unwrap();
        assert_eq!(repo.tag_target("v1"), Some(&CommitId::from("c3")));

        repo.delete_tag("v1.0.0").unwrap();
        assert!(repo.delete_tag("v1.0.0").is_err());
        assert_eq!(repo.list_tags().unwrap().len(), 1);
    }

    #[test]
    fn test_create_branch() {
        let mut repo = repo();
        repo.create_branch("release/v1", &CommitId::from("c3"))
            .unwrap();
        assert!(repo
            .create_branch("release/v1", &CommitId::from("c2"))
            .is_err());
        assert_eq!(repo.branch_head("release/v1"), Some(&CommitId::from("c3")));
    }

    #[test]
    fn test_push_is_recorded() {
        let repo = repo();
        repo.push_refs("origin", &["+refs/tags/v1:refs/tags/v1".to_string()])
            .unwrap();
        assert_eq!(
            repo.pushed(),
            vec![(
                "origin".to_string(),
                "+refs/tags/v1:refs/tags/v1".to_string()
            )]
        );
    }

    #[test]
    fn test_current_branch() {
        let mut repo = repo();
        assert_eq!(repo.current_branch().unwrap(), None);
        repo.checkout("main");
        assert_eq!(repo.current_branch().unwrap(), Some("main".to_string()));
    }
}
