use crate::domain::{Branch, CommitId, Tag};
use crate::error::{GitBumpError, Result};
use git2::{BranchType, Oid, Repository as Git2Repo};
use std::path::Path;
use tracing::{debug, warn};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn oid(commit: &CommitId) -> Result<Oid> {
        Oid::from_str(commit.as_str())
            .map_err(|e| GitBumpError::tag(format!("Invalid commit id '{}': {}", commit, e)))
    }

    fn branch_tip(&self, branch_name: &str) -> Result<Oid> {
        let branch = self
            .repo
            .find_branch(branch_name, BranchType::Local)
            .map_err(|e| {
                GitBumpError::branch(format!("Cannot find branch '{}': {}", branch_name, e))
            })?;

        let commit = branch.into_reference().peel_to_commit().map_err(|e| {
            GitBumpError::branch(format!("Branch '{}' has no target: {}", branch_name, e))
        })?;

        Ok(commit.id())
    }
}

/// Credential callbacks shared by fetch and push: SSH keys from ~/.ssh,
/// then the SSH agent, then git's default credential helpers.
fn remote_callbacks<'a>() -> git2::RemoteCallbacks<'a> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        git2::Cred::default()
    });
    callbacks
}

impl super::Repository for Git2Repository {
    fn list_tags(&self) -> Result<Vec<Tag>> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::new();

        for name in names.iter().flatten() {
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            match reference.peel_to_commit() {
                Ok(commit) => tags.push(Tag::new(name, commit.id())),
                Err(e) => debug!(tag = name, error = %e, "skipping tag that does not point at a commit"),
            }
        }

        Ok(tags)
    }

    fn list_branches(&self) -> Result<Vec<Branch>> {
        let mut branches = Vec::new();

        for entry in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            let name = match branch.name()? {
                Some(name) => name.to_string(),
                None => continue,
            };
            let commit = branch.into_reference().peel_to_commit()?;
            branches.push(Branch::new(name, commit.id()));
        }

        Ok(branches)
    }

    fn commits_reachable_from(&self, branch: &str) -> Result<Vec<CommitId>> {
        let tip = self.branch_tip(branch)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(tip)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            commits.push(CommitId::from(oid?));
        }

        Ok(commits)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        };

        if !head.is_branch() {
            return Ok(None);
        }

        Ok(head.shorthand().map(|s| s.to_string()))
    }

    fn create_tag(&mut self, name: &str, commit: &CommitId) -> Result<()> {
        let object = self
            .repo
            .find_object(Self::oid(commit)?, None)
            .map_err(|e| GitBumpError::tag(format!("Cannot find object: {}", e)))?;

        self.repo
            .tag_lightweight(name, &object, false)
            .map_err(|e| GitBumpError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

        Ok(())
    }

    fn force_move_tag(&mut self, name: &str, commit: &CommitId) -> Result<()> {
        let object = self
            .repo
            .find_object(Self::oid(commit)?, None)
            .map_err(|e| GitBumpError::tag(format!("Cannot find object: {}", e)))?;

        self.repo
            .tag_lightweight(name, &object, true)
            .map_err(|e| GitBumpError::tag(format!("Cannot move tag '{}': {}", name, e)))?;

        Ok(())
    }

    fn delete_tag(&mut self, name: &str) -> Result<()> {
        self.repo
            .tag_delete(name)
            .map_err(|e| GitBumpError::tag(format!("Cannot delete tag '{}': {}", name, e)))
    }

    fn create_branch(&mut self, name: &str, commit: &CommitId) -> Result<()> {
        let target = self
            .repo
            .find_commit(Self::oid(commit)?)
            .map_err(|e| GitBumpError::branch(format!("Cannot find commit: {}", e)))?;

        self.repo
            .branch(name, &target, false)
            .map_err(|e| GitBumpError::branch(format!("Cannot create branch '{}': {}", name, e)))?;

        Ok(())
    }

    fn fetch_from_remote(&self, remote: &str) -> Result<()> {
        let mut remote_handle = self
            .repo
            .find_remote(remote)
            .map_err(|e| GitBumpError::remote(format!("Cannot find remote: {}", e)))?;

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks());

        // Aliases are force-moved upstream, so tags are fetched with '+'.
        let refspec_heads = format!("+refs/heads/*:refs/remotes/{}/*", remote);
        let refspecs = [refspec_heads.as_str(), "+refs/tags/*:refs/tags/*"];

        remote_handle
            .fetch(&refspecs, Some(&mut fetch_options), None)
            .map_err(|e| match e.code() {
                git2::ErrorCode::Auth => GitBumpError::remote(format!(
                    "Authentication failed for '{}': {}",
                    remote,
                    e.message()
                )),
                _ => GitBumpError::remote(format!("Fetch from '{}' failed: {}", remote, e)),
            })?;

        Ok(())
    }

    fn push_refs(&self, remote: &str, refspecs: &[String]) -> Result<()> {
        let mut remote_handle = self
            .repo
            .find_remote(remote)
            .map_err(|e| GitBumpError::remote(format!("Cannot find remote: {}", e)))?;

        let mut callbacks = remote_callbacks();
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => {
                warn!(reference = refname, status, "remote rejected reference update");
                Err(git2::Error::from_str(&format!("Push failed for {}", refname)))
            }
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec_strs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();

        remote_handle
            .push(&refspec_strs, Some(&mut push_options))
            .map_err(|e| match e.class() {
                git2::ErrorClass::Net => {
                    GitBumpError::remote(format!("Network error during push: {}", e))
                }
                git2::ErrorClass::Reference => {
                    GitBumpError::remote(format!("Reference error during push: {}", e))
                }
                _ => GitBumpError::remote(format!("Push to '{}' failed: {}", remote, e)),
            })?;

        Ok(())
    }
}
