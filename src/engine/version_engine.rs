use crate::boundary::BoundaryWarning;
use crate::domain::{
    major_alias_name, release_branch_name, BranchKind, BumpType, CommitId, RepositorySnapshot,
    SemanticVersion, Tag,
};
use crate::engine::{AliasMove, BumpRequest, BumpResult, ReleaseBranchPlan};
use crate::error::EngineError;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Computes the next release for a branch from an immutable snapshot.
///
/// The engine never touches git: the same snapshot and request always
/// produce the same result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEngine {
    main_branch: String,
}

impl Default for VersionEngine {
    fn default() -> Self {
        VersionEngine::new("main")
    }
}

impl VersionEngine {
    /// Create an engine for a repository whose development branch is `main_branch`
    pub fn new(main_branch: impl Into<String>) -> Self {
        VersionEngine {
            main_branch: main_branch.into(),
        }
    }

    pub fn main_branch(&self) -> &str {
        &self.main_branch
    }

    /// Decide the next version, alias move and release branch for a request.
    ///
    /// Failures are checked in a fixed order: branch format, branch
    /// existence, first release, major bump on a release branch, a missing
    /// base version, version overflow, major mismatch, then ambiguous tags.
    pub fn compute(
        &self,
        snapshot: &RepositorySnapshot,
        request: &BumpRequest,
    ) -> Result<BumpResult, EngineError> {
        let branch_name = request.target_branch.as_str();
        let branch_kind = BranchKind::classify(branch_name, &self.main_branch).ok_or_else(|| {
            EngineError::InvalidBranchFormat {
                branch: branch_name.to_string(),
                main: self.main_branch.clone(),
            }
        })?;

        let target = snapshot
            .branch(branch_name)
            .ok_or_else(|| EngineError::BranchNotFound(branch_name.to_string()))?;

        let all_versions = snapshot.version_tags();
        let first_release = all_versions.is_empty();

        if first_release && !branch_kind.is_main() {
            return Err(EngineError::FirstReleaseMustBeMain {
                branch: branch_name.to_string(),
                main: self.main_branch.clone(),
            });
        }

        if let BranchKind::Release(_) = branch_kind {
            if request.bump_type == BumpType::Major {
                return Err(EngineError::MajorBumpNotAllowedOnReleaseBranch(
                    branch_name.to_string(),
                ));
            }
        }

        let mut warnings = unparsable_tag_warnings(snapshot);

        let tip_only: BTreeSet<CommitId> = std::iter::once(target.commit.clone()).collect();
        let reachable = snapshot.reachable_from(branch_name).unwrap_or(&tip_only);

        let on_branch: Vec<(SemanticVersion, &Tag)> = all_versions
            .iter()
            .filter(|(_, tag)| reachable.contains(&tag.commit))
            .map(|(version, tag)| (*version, *tag))
            .collect();

        let candidates: Vec<(SemanticVersion, &Tag)> = match branch_kind {
            BranchKind::Main => on_branch.clone(),
            BranchKind::Release(major) => on_branch
                .iter()
                .filter(|(version, _)| version.major == major)
                .copied()
                .collect(),
        };

        let latest = match candidates.iter().max_by_key(|(version, _)| *version) {
            Some((version, tag)) => Some((*version, *tag)),
            None if first_release => None,
            None => {
                return Err(match branch_kind {
                    BranchKind::Main => EngineError::NoReachableVersion(branch_name.to_string()),
                    BranchKind::Release(major) => EngineError::MajorVersionMismatch {
                        branch: branch_name.to_string(),
                        expected: major,
                        found: describe_reachable(&on_branch),
                    },
                })
            }
        };

        let base = latest.map(|(v, _)| v).unwrap_or(SemanticVersion::INITIAL);
        let new_version = base
            .bump(request.bump_type)
            .ok_or_else(|| EngineError::VersionOverflow {
                version: base.to_string(),
                bump: request.bump_type.to_string(),
            })?;

        if let BranchKind::Release(major) = branch_kind {
            if new_version.major != major {
                return Err(EngineError::MajorVersionMismatch {
                    branch: branch_name.to_string(),
                    expected: major,
                    found: format!("the computed version is {}", new_version),
                });
            }
        }

        if let Some((latest_version, latest_tag)) = latest {
            check_ambiguity(snapshot, &candidates, latest_version, latest_tag, new_version)?;

            if latest_tag.commit == target.commit {
                warnings.push(BoundaryWarning::NoNewCommits {
                    latest_tag: latest_tag.name.clone(),
                    current_commit_hash: target.commit.to_string(),
                });
            }
        }

        debug!(
            branch = branch_name,
            latest = %latest.map(|(v, _)| v.to_string()).unwrap_or_else(|| "none".to_string()),
            candidates = candidates.len(),
            "resolved latest version"
        );

        let release_branch_to_create = match (branch_kind, latest) {
            (BranchKind::Main, Some((latest_version, latest_tag)))
                if request.bump_type == BumpType::Major && latest_version.major >= 1 =>
            {
                let name = release_branch_name(latest_version.major);
                if snapshot.branch(&name).is_some() {
                    warnings.push(BoundaryWarning::ReleaseBranchExists { branch: name });
                    None
                } else {
                    Some(ReleaseBranchPlan {
                        name,
                        commit: latest_tag.commit.clone(),
                        from_version: latest_version,
                    })
                }
            }
            _ => None,
        };

        let alias_name = major_alias_name(new_version.major);
        let previous_alias_commit = snapshot.tag(&alias_name).map(|t| t.commit.clone());
        let opens_new_line = first_release || request.bump_type == BumpType::Major;
        if previous_alias_commit.is_none() && !opens_new_line {
            warnings.push(BoundaryWarning::AliasMissing {
                alias: alias_name.clone(),
            });
        }

        let result = BumpResult {
            new_version,
            target_branch: branch_name.to_string(),
            target_commit: target.commit.clone(),
            previous_version: latest.map(|(v, _)| v),
            major_alias: AliasMove {
                name: alias_name,
                target: new_version,
                commit: target.commit.clone(),
                previous_commit: previous_alias_commit,
            },
            release_branch_to_create,
            first_release,
            warnings,
        };

        info!(
            branch = branch_name,
            bump = %request.bump_type,
            new_version = %result.new_version,
            first_release = result.first_release,
            promotion = base.is_promotion(request.bump_type),
            release_branch = result
                .release_branch_to_create
                .as_ref()
                .map(|b| b.name.as_str())
                .unwrap_or("none"),
            "computed version bump"
        );

        Ok(result)
    }
}

/// Reject tag states where the "latest" release is not well defined.
///
/// Two situations are ambiguous: the commit carrying the latest version also
/// carries another version tag of the same line, or a tag for the computed
/// next version already exists somewhere in the repository.
fn check_ambiguity(
    snapshot: &RepositorySnapshot,
    candidates: &[(SemanticVersion, &Tag)],
    latest_version: SemanticVersion,
    latest_tag: &Tag,
    new_version: SemanticVersion,
) -> Result<(), EngineError> {
    let mut sharing: Vec<&str> = candidates
        .iter()
        .filter(|(version, tag)| *version != latest_version && tag.commit == latest_tag.commit)
        .map(|(_, tag)| tag.name.as_str())
        .collect();

    if !sharing.is_empty() {
        sharing.sort_unstable();
        return Err(EngineError::DuplicateOrAmbiguousTag(format!(
            "tags {} and {} all point at commit {}; delete the stale tag and retry",
            sharing.join(", "),
            latest_tag.name,
            latest_tag.commit.short()
        )));
    }

    if let Some(existing) = snapshot.tag(&new_version.tag_name()) {
        return Err(EngineError::DuplicateOrAmbiguousTag(format!(
            "next version {} is already tagged at commit {}, which is not on this branch's history after {}",
            new_version,
            existing.commit.short(),
            latest_tag.name
        )));
    }

    Ok(())
}

fn describe_reachable(on_branch: &[(SemanticVersion, &Tag)]) -> String {
    match on_branch.iter().map(|(v, _)| *v).max() {
        Some(version) => format!("the latest reachable version is {}", version),
        None => "no version tag is reachable from it".to_string(),
    }
}

/// Tags that start like a version (`v` + digit) but are not `vX.Y.Z` or `vN`
pub fn unparsable_tag_warnings(snapshot: &RepositorySnapshot) -> Vec<BoundaryWarning> {
    snapshot
        .other_tags()
        .into_iter()
        .filter(|tag| {
            let mut chars = tag.name.chars();
            chars.next() == Some('v') && chars.next().is_some_and(|c| c.is_ascii_digit())
        })
        .map(|tag| BoundaryWarning::UnparsableTag {
            tag: tag.name.clone(),
            reason: "not a vX.Y.Z release or vN alias; ignored".to_string(),
        })
        .collect()
}
