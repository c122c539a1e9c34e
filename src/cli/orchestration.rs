//! Main workflow orchestration logic
//!
//! Each command is a function over a [`Repository`] so the workflows can be
//! driven by the binary against git or by tests against
//! [`MockRepository`](crate::git::MockRepository). Prompts are injected as a
//! `confirm` callback.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::{BumpType, CommitId, LineState, RepositorySnapshot, SemanticVersion};
use crate::engine::{unparsable_tag_warnings, BumpRequest, BumpResult, VersionEngine};
use crate::error::GitBumpError;
use crate::fixture::{run_scenario, Scenario, ScenarioReport};
use crate::git::Repository;
use crate::outputs::WorkflowOutputs;
use crate::release::{self, ApplyOptions, ApplyReport, RefAction};
use crate::ui;

/// Arguments for the bump workflow
#[derive(Debug, Clone, PartialEq)]
pub struct BumpWorkflowArgs {
    pub bump_type: BumpType,
    /// Target branch; the checked-out branch when `None`
    pub branch: Option<String>,
}

/// Arguments for the release workflow
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseWorkflowArgs {
    pub bump_type: BumpType,
    pub branch: Option<String>,
    /// Push the release refs (also enabled by `release.push`)
    pub push: bool,
    /// Preview mode - compute and plan, write nothing
    pub dry_run: bool,
    /// Skip confirmation prompts
    pub force: bool,
}

/// Result of a bump or release workflow
#[derive(Debug, Clone)]
pub struct WorkflowResult {
    pub bump: BumpResult,
    pub outputs: WorkflowOutputs,
    /// Ref changes of a release; `None` for a plain bump
    pub applied: Option<ApplyReport>,
    /// Whether the outputs were appended to `$GITHUB_OUTPUT`
    pub github_output_written: bool,
}

/// A major alias and the release it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasStatus {
    pub name: String,
    pub commit: CommitId,
    /// Highest version of the alias's line tagged on the same commit
    pub version: Option<SemanticVersion>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBranchStatus {
    pub name: String,
    pub major: u64,
    pub latest_version: Option<SemanticVersion>,
}

/// Output of the `status` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub line_state: LineState,
    pub latest_version: Option<SemanticVersion>,
    pub current_branch: Option<String>,
    pub aliases: Vec<AliasStatus>,
    pub release_branches: Vec<ReleaseBranchStatus>,
    pub warnings: Vec<BoundaryWarning>,
}

/// Compute the next version without touching any ref.
pub fn run_bump_workflow<R: Repository + ?Sized>(
    repo: &R,
    args: &BumpWorkflowArgs,
    config: &Config,
) -> Result<WorkflowResult> {
    if config.release.fetch {
        if let Some(warning) = refresh_from_remote(repo, &config.repository.remote) {
            report_warnings(&[warning]);
        }
    }

    let branch = resolve_branch(repo, args.branch.as_deref())?;
    let bump = compute_bump(repo, &branch, args.bump_type, config)?;
    report_warnings(&bump.warnings);
    ui::display_bump_result(&bump);

    let outputs = WorkflowOutputs::for_bump(&bump);
    let github_output_written = publish_outputs(&outputs, config)?;

    Ok(WorkflowResult {
        bump,
        outputs,
        applied: None,
        github_output_written,
    })
}

/// Compute the next version and write (optionally push) the release refs.
///
/// Returns `Ok(None)` when the user declines a confirmation prompt. Prompts
/// are skipped with `force` or `dry_run`. A branch whose tip is already
/// released is refused in every mode.
pub fn run_release_workflow<R, F>(
    repo: &mut R,
    args: &ReleaseWorkflowArgs,
    config: &Config,
    mut confirm: F,
) -> Result<Option<WorkflowResult>>
where
    R: Repository + ?Sized,
    F: FnMut(&str) -> Result<bool>,
{
    let interactive = !args.force && !args.dry_run;
    let remote = config.repository.remote.as_str();

    if config.release.fetch {
        if let Some(warning) = refresh_from_remote(&*repo, remote) {
            report_warnings(std::slice::from_ref(&warning));
            if interactive && !confirm("Continue using local data?")? {
                return Ok(None);
            }
        }
    }

    let branch = resolve_branch(&*repo, args.branch.as_deref())?;
    let bump = compute_bump(&*repo, &branch, args.bump_type, config)?;
    report_warnings(&bump.warnings);

    ui::display_bump_result(&bump);

    // Refuses an already released tip before asking anything, force or not
    release::plan(&*repo, &bump)?;
    if interactive
        && !confirm(&format!(
            "Release {} on '{}'?",
            bump.new_version, bump.target_branch
        ))?
    {
        return Ok(None);
    }

    let push_to = (args.push || config.release.push).then(|| remote.to_string());
    let report = release::apply(
        repo,
        &bump,
        &ApplyOptions {
            dry_run: args.dry_run,
            push_to: push_to.clone(),
        },
    )?;
    ui::display_actions(&report);

    if !report.dry_run && push_to.is_none() {
        let changed: Vec<String> = report
            .actions
            .iter()
            .filter(|a| a.changes_refs())
            .map(RefAction::refspec)
            .collect();
        if !changed.is_empty() {
            ui::display_manual_push_instruction(&changed, remote);
        }
    }

    let outputs = WorkflowOutputs::for_release(&bump, &report.major_version);
    let github_output_written = if report.dry_run {
        false
    } else {
        publish_outputs(&outputs, config)?
    };

    info!(
        version = %bump.new_version,
        dry_run = report.dry_run,
        pushed = report.pushed.len(),
        "release finished"
    );

    Ok(Some(WorkflowResult {
        bump,
        outputs,
        applied: Some(report),
        github_output_written,
    }))
}

/// Summarize the release lines of a repository
pub fn run_status<R: Repository + ?Sized>(repo: &R, config: &Config) -> Result<StatusReport> {
    let main_branch = config.repository.main_branch.as_str();
    let snapshot = RepositorySnapshot::capture(repo, main_branch, None)?;
    let versions = snapshot.version_tags();

    let aliases = snapshot
        .major_aliases()
        .into_iter()
        .map(|(major, tag)| AliasStatus {
            name: tag.name.clone(),
            commit: tag.commit.clone(),
            version: versions
                .iter()
                .filter(|(v, t)| v.major == major && t.commit == tag.commit)
                .map(|(v, _)| *v)
                .max(),
        })
        .collect();

    let release_branches = snapshot
        .release_branches(main_branch)
        .into_iter()
        .map(|(major, branch)| {
            let reachable = snapshot.reachable_from(&branch.name);
            ReleaseBranchStatus {
                name: branch.name.clone(),
                major,
                latest_version: versions
                    .iter()
                    .filter(|(v, t)| {
                        v.major == major && reachable.is_some_and(|r| r.contains(&t.commit))
                    })
                    .map(|(v, _)| *v)
                    .max(),
            }
        })
        .collect();

    Ok(StatusReport {
        line_state: snapshot.line_state(),
        latest_version: snapshot.highest_version(),
        current_branch: snapshot.current_branch().map(str::to_string),
        aliases,
        release_branches,
        warnings: unparsable_tag_warnings(&snapshot),
    })
}

/// Run scenario fixtures. Directories contribute every `*.json` file they
/// contain, in name order.
pub fn run_verify(paths: &[PathBuf]) -> Result<Vec<ScenarioReport>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(fixture_files(path)?);
        } else {
            files.push(path.clone());
        }
    }

    files
        .iter()
        .map(|file| {
            let scenario = Scenario::load(file)?;
            run_scenario(&scenario)
                .with_context(|| format!("Failed to run scenario '{}'", file.display()))
        })
        .collect()
}

fn fixture_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Cannot read fixture directory '{}'", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

fn resolve_branch<R: Repository + ?Sized>(repo: &R, branch: Option<&str>) -> Result<String> {
    match branch {
        Some(branch) => Ok(branch.to_string()),
        None => repo
            .current_branch()?
            .context("HEAD is detached; pass --branch to choose the release branch"),
    }
}

fn compute_bump<R: Repository + ?Sized>(
    repo: &R,
    branch: &str,
    bump_type: BumpType,
    config: &Config,
) -> Result<BumpResult> {
    let main_branch = config.repository.main_branch.as_str();
    let snapshot = RepositorySnapshot::capture(repo, main_branch, Some(branch))?;
    let bump = VersionEngine::new(main_branch)
        .compute(&snapshot, &BumpRequest::new(bump_type, branch))
        .map_err(GitBumpError::from)?;
    Ok(bump)
}

/// Fetch refs from the remote. Authentication failures come back as a
/// warning; other failures are logged and the local data is used.
fn refresh_from_remote<R: Repository + ?Sized>(repo: &R, remote: &str) -> Option<BoundaryWarning> {
    ui::display_status(&format!("Fetching latest data from '{}'...", remote));
    match repo.fetch_from_remote(remote) {
        Ok(()) => {
            info!(remote, "fetched branches and tags");
            None
        }
        Err(e) if is_authentication_error(&e) => Some(BoundaryWarning::FetchAuthenticationFailed {
            remote: remote.to_string(),
        }),
        Err(e) => {
            warn!(remote, error = %e, "fetch failed");
            ui::display_status(&format!(
                "Warning: Could not fetch from remote: {}. Using local data.",
                e
            ));
            None
        }
    }
}

fn is_authentication_error(error: &GitBumpError) -> bool {
    let message = error.to_string().to_lowercase();
    message.contains("auth") || message.contains("permission")
}

fn report_warnings(warnings: &[BoundaryWarning]) {
    for warning in warnings {
        warn!(%warning, "boundary warning");
        ui::display_boundary_warning(warning);
    }
}

fn publish_outputs(outputs: &WorkflowOutputs, config: &Config) -> Result<bool> {
    if !config.outputs.github_output {
        return Ok(false);
    }
    let written = outputs
        .append_to_github_output()
        .context("Failed to write $GITHUB_OUTPUT")?;
    Ok(written)
}
