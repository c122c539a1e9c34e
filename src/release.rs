//! Applies a computed [`BumpResult`] to a repository.
//!
//! This is the only side-effecting step of a release. Every mutation is
//! planned against the repository's current refs first, so applying the same
//! result twice creates nothing new. Applying it over a conflicting tag, or
//! onto a commit that is already released, fails before anything is written.

use crate::domain::{CommitId, SemanticVersion};
use crate::engine::BumpResult;
use crate::error::{GitBumpError, Result};
use crate::git::Repository;
use std::fmt;
use tracing::info;

/// One ref change (or deliberate non-change) of a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefAction {
    CreateTag { name: String, commit: CommitId },
    /// The version tag already points at the release commit
    KeepTag { name: String },
    MoveAlias {
        name: String,
        from: Option<CommitId>,
        to: CommitId,
    },
    /// The alias already points at the release commit
    KeepAlias { name: String },
    CreateBranch { name: String, commit: CommitId },
    /// The release branch exists; it is never recreated or moved
    KeepBranch { name: String },
}

impl RefAction {
    /// Refspec that publishes this ref to a remote
    pub fn refspec(&self) -> String {
        match self {
            RefAction::CreateTag { name, .. } | RefAction::KeepTag { name } => {
                format!("refs/tags/{0}:refs/tags/{0}", name)
            }
            RefAction::MoveAlias { name, .. } | RefAction::KeepAlias { name } => {
                format!("+refs/tags/{0}:refs/tags/{0}", name)
            }
            RefAction::CreateBranch { name, .. } | RefAction::KeepBranch { name } => {
                format!("refs/heads/{0}:refs/heads/{0}", name)
            }
        }
    }

    pub fn changes_refs(&self) -> bool {
        matches!(
            self,
            RefAction::CreateTag { .. } | RefAction::MoveAlias { .. } | RefAction::CreateBranch { .. }
        )
    }
}

impl fmt::Display for RefAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefAction::CreateTag { name, commit } => {
                write!(f, "create tag {} at {}", name, commit.short())
            }
            RefAction::KeepTag { name } => write!(f, "tag {} already in place", name),
            RefAction::MoveAlias { name, from, to } => match from {
                Some(from) => write!(f, "move alias {} from {} to {}", name, from.short(), to.short()),
                None => write!(f, "create alias {} at {}", name, to.short()),
            },
            RefAction::KeepAlias { name } => write!(f, "alias {} already in place", name),
            RefAction::CreateBranch { name, commit } => {
                write!(f, "create branch {} at {}", name, commit.short())
            }
            RefAction::KeepBranch { name } => write!(f, "branch {} already exists", name),
        }
    }
}

/// How to apply a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    pub dry_run: bool,
    /// Remote to push to after the local refs are written
    pub push_to: Option<String>,
}

/// What a release did (or would do, for a dry run)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub actions: Vec<RefAction>,
    pub pushed: Vec<String>,
    pub dry_run: bool,
    /// Alias tag the release moved, e.g. `v2`
    pub major_version: String,
}

/// Work out the ref changes a result needs, given the repository's current refs.
///
/// Fails with a tag error when the version tag exists at a different commit:
/// that tag was released from somewhere else and must not be overwritten.
/// Also fails when the release commit already carries another version tag,
/// since a second version on one commit makes every later bump ambiguous.
pub fn plan<R: Repository + ?Sized>(repo: &R, result: &BumpResult) -> Result<Vec<RefAction>> {
    let tags = repo.list_tags()?;
    let branches = repo.list_branches()?;
    let tag_commit = |name: &str| tags.iter().find(|t| t.name == name).map(|t| t.commit.clone());

    let version_tag = result.new_tag();

    let mut released: Vec<&str> = tags
        .iter()
        .filter(|t| t.commit == result.target_commit && t.name != version_tag)
        .filter(|t| SemanticVersion::parse_tag(&t.name).is_ok())
        .map(|t| t.name.as_str())
        .collect();
    if !released.is_empty() {
        released.sort_unstable();
        return Err(GitBumpError::tag(format!(
            "Commit {} is already released as {}; commit new changes before releasing {}",
            result.target_commit.short(),
            released.join(", "),
            version_tag
        )));
    }

    let mut actions = Vec::new();

    match tag_commit(&version_tag) {
        Some(commit) if commit == result.target_commit => {
            actions.push(RefAction::KeepTag { name: version_tag })
        }
        Some(commit) => {
            return Err(GitBumpError::tag(format!(
                "Tag '{}' already exists at {} (release commit is {})",
                version_tag,
                commit.short(),
                result.target_commit.short()
            )))
        }
        None => actions.push(RefAction::CreateTag {
            name: version_tag,
            commit: result.target_commit.clone(),
        }),
    }

    let alias = &result.major_alias;
    match tag_commit(&alias.name) {
        Some(commit) if commit == alias.commit => actions.push(RefAction::KeepAlias {
            name: alias.name.clone(),
        }),
        from => actions.push(RefAction::MoveAlias {
            name: alias.name.clone(),
            from,
            to: alias.commit.clone(),
        }),
    }

    if let Some(plan) = &result.release_branch_to_create {
        if branches.iter().any(|b| b.name == plan.name) {
            actions.push(RefAction::KeepBranch {
                name: plan.name.clone(),
            });
        } else {
            actions.push(RefAction::CreateBranch {
                name: plan.name.clone(),
                commit: plan.commit.clone(),
            });
        }
    }

    Ok(actions)
}

/// Plan and, unless this is a dry run, write the release refs.
///
/// The release branch is created before the alias moves so that the
/// superseded line is preserved even if a later step fails.
pub fn apply<R: Repository + ?Sized>(
    repo: &mut R,
    result: &BumpResult,
    options: &ApplyOptions,
) -> Result<ApplyReport> {
    let mut actions = plan(repo, result)?;
    actions.sort_by_key(|action| match action {
        RefAction::CreateBranch { .. } | RefAction::KeepBranch { .. } => 0,
        RefAction::CreateTag { .. } | RefAction::KeepTag { .. } => 1,
        RefAction::MoveAlias { .. } | RefAction::KeepAlias { .. } => 2,
    });

    let refspecs: Vec<String> = actions.iter().map(RefAction::refspec).collect();
    let major_version = result.major_alias.name.clone();

    if options.dry_run {
        return Ok(ApplyReport {
            actions,
            pushed: Vec::new(),
            dry_run: true,
            major_version,
        });
    }

    for action in &actions {
        match action {
            RefAction::CreateTag { name, commit } => repo.create_tag(name, commit)?,
            RefAction::MoveAlias { name, to, .. } => repo.force_move_tag(name, to)?,
            RefAction::CreateBranch { name, commit } => repo.create_branch(name, commit)?,
            RefAction::KeepTag { .. } | RefAction::KeepAlias { .. } | RefAction::KeepBranch { .. } => {}
        }
        if action.changes_refs() {
            info!(action = %action, "applied ref change");
        }
    }

    let pushed = match &options.push_to {
        Some(remote) => {
            repo.push_refs(remote, &refspecs)?;
            info!(remote = %remote, refs = refspecs.len(), "pushed release refs");
            refspecs
        }
        None => Vec::new(),
    };

    Ok(ApplyReport {
        actions,
        pushed,
        dry_run: false,
        major_version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BumpType, RepositorySnapshot};
    use crate::engine::{BumpRequest, VersionEngine};
    use crate::git::MockRepository;

    fn repo() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.add_linear_history(&["c1", "c2", "c3"]);
        repo.set_branch_head("main", "c3");
        repo.add_tag("v1.1.0", "c1");
        repo.add_tag("v1.2.0", "c2");
        repo.add_tag("v1", "c2");
        repo.checkout("main");
        repo
    }

    fn compute(repo: &MockRepository, bump: BumpType) -> BumpResult {
        let snapshot = RepositorySnapshot::capture(repo, "main", Some("main")).unwrap();
        VersionEngine::default()
            .compute(&snapshot, &BumpRequest::new(bump, "main"))
            .unwrap()
    }

    fn write() -> ApplyOptions {
        ApplyOptions {
            dry_run: false,
            push_to: None,
        }
    }

    #[test]
    fn test_apply_major_release() {
        let mut repo = repo();
        let result = compute(&repo, BumpType::Major);

        let report = apply(&mut repo, &result, &write()).unwrap();
        assert_eq!(report.major_version, "v2");
        assert!(matches!(report.actions[0], RefAction::CreateBranch { .. }));

        assert_eq!(repo.tag_target("v2.0.0"), Some(&CommitId::from("c3")));
        assert_eq!(repo.tag_target("v2"), Some(&CommitId::from("c3")));
        assert_eq!(repo.tag_target("v1"), Some(&CommitId::from("c2")));
        assert_eq!(repo.branch_head("release/v1"), Some(&CommitId::from("c2")));
    }

    #[test]
    fn test_apply_twice_is_a_noop() {
        let mut repo = repo();
        let result = compute(&repo, BumpType::Major);
        apply(&mut repo, &result, &write()).unwrap();

        let again = apply(&mut repo, &result, &write()).unwrap();
        assert!(again.actions.iter().all(|a| !a.changes_refs()));
    }

    #[test]
    fn test_conflicting_tag_is_rejected() {
        let mut repo = repo();
        let result = compute(&repo, BumpType::Patch);
        repo.add_tag("v1.2.1", "c1");

        let err = apply(&mut repo, &result, &write()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(repo.tag_target("v1"), Some(&CommitId::from("c2")));
    }

    #[test]
    fn test_released_commit_is_not_tagged_again() {
        let mut repo = repo();
        repo.set_branch_head("main", "c2");
        let result = compute(&repo, BumpType::Patch);
        assert_eq!(result.new_tag(), "v1.2.1");

        let err = apply(&mut repo, &result, &write()).unwrap_err();
        assert!(matches!(err, GitBumpError::Tag(_)));
        assert!(err.to_string().contains("already released as v1.2.0"));
        assert_eq!(repo.tag_target("v1.2.1"), None);
        assert_eq!(repo.tag_target("v1"), Some(&CommitId::from("c2")));

        // aliases and unrelated tags on the commit do not count
        let mut repo = MockRepository::new();
        repo.add_linear_history(&["c1", "c2"]);
        repo.set_branch_head("main", "c2");
        repo.add_tag("v1.0.0", "c1");
        repo.add_tag("v1", "c2");
        repo.add_tag("nightly", "c2");
        let result = compute(&repo, BumpType::Patch);
        apply(&mut repo, &result, &write()).unwrap();
        assert_eq!(repo.tag_target("v1.0.1"), Some(&CommitId::from("c2")));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let mut repo = repo();
        let result = compute(&repo, BumpType::Minor);
        let report = apply(
            &mut repo,
            &result,
            &ApplyOptions {
                dry_run: true,
                push_to: Some("origin".to_string()),
            },
        )
        .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.actions.len(), 2);
        assert!(report.pushed.is_empty());
        assert_eq!(repo.tag_target("v1.3.0"), None);
        assert!(repo.pushed().is_empty());
    }

    #[test]
    fn test_push_sends_all_release_refs() {
        let mut repo = repo();
        let result = compute(&repo, BumpType::Patch);
        let report = apply(
            &mut repo,
            &result,
            &ApplyOptions {
                dry_run: false,
                push_to: Some("origin".to_string()),
            },
        )
        .unwrap();

        assert_eq!(
            report.pushed,
            vec![
                "refs/tags/v1.2.1:refs/tags/v1.2.1".to_string(),
                "+refs/tags/v1:refs/tags/v1".to_string(),
            ]
        );
        assert_eq!(repo.pushed().len(), 2);
    }

    #[test]
    fn test_action_display() {
        let action = RefAction::MoveAlias {
            name: "v1".to_string(),
            from: Some(CommitId::from("aaaaaaaaaa")),
            to: CommitId::from("bbbbbbbbbb"),
        };
        assert_eq!(action.to_string(), "move alias v1 from aaaaaaa to bbbbbbb");
    }
}
