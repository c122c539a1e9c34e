use super::scenario::{Check, Scenario};
use crate::domain::{CommitId, RepositorySnapshot};
use crate::engine::{BumpRequest, BumpResult, VersionEngine};
use crate::error::{EngineError, Result};
use crate::git::MockRepository;
use crate::outputs::WorkflowOutputs;
use crate::release::{self, ApplyOptions};
use tracing::debug;

/// Result of evaluating a single check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub check: Check,
    pub passed: bool,
    pub detail: String,
}

/// Everything a scenario run produced
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub name: String,
    pub outcome: std::result::Result<BumpResult, EngineError>,
    pub checks: Vec<CheckOutcome>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// Run a scenario end to end against an in-memory repository.
///
/// On success the release is applied to the repository before the checks
/// run, so tag and alias checks see the post-release state. Engine errors are
/// part of the report; only a broken fixture or a failing apply is an `Err`.
pub fn run_scenario(scenario: &Scenario) -> Result<ScenarioReport> {
    let fixture = &scenario.repository;
    let mut repo = fixture.build();
    let request = BumpRequest::new(scenario.request.bump_type, &scenario.request.target_branch);

    let snapshot =
        RepositorySnapshot::capture(&repo, &fixture.main_branch, Some(request.target_branch.as_str()))?;
    let outcome = VersionEngine::new(&fixture.main_branch).compute(&snapshot, &request);

    let outputs = match &outcome {
        Ok(result) => {
            let report = release::apply(
                &mut repo,
                result,
                &ApplyOptions {
                    dry_run: false,
                    push_to: None,
                },
            )?;
            Some(WorkflowOutputs::for_release(result, &report.major_version))
        }
        Err(err) => {
            debug!(scenario = %scenario.name, error = %err, "bump failed");
            None
        }
    };

    let checks = scenario
        .checks
        .iter()
        .map(|check| evaluate(check, &outcome, &repo, outputs.as_ref()))
        .collect();

    Ok(ScenarioReport {
        name: scenario.name.clone(),
        outcome,
        checks,
    })
}

fn evaluate(
    check: &Check,
    outcome: &std::result::Result<BumpResult, EngineError>,
    repo: &MockRepository,
    outputs: Option<&WorkflowOutputs>,
) -> CheckOutcome {
    let verdict = match (check, outcome) {
        (Check::Error { expected }, Err(err)) => {
            compare(&expected.to_string(), &err.kind().to_string())
        }
        (Check::Error { .. }, Ok(result)) => Err(format!(
            "bump succeeded with {}",
            result.new_version
        )),
        (_, Err(err)) => Err(format!("bump failed: {}", err)),
        (check, Ok(result)) => evaluate_success(check, result, repo, outputs),
    };

    let (passed, detail) = match verdict {
        Ok(()) => (true, "ok".to_string()),
        Err(detail) => (false, detail),
    };
    CheckOutcome {
        check: check.clone(),
        passed,
        detail,
    }
}

fn evaluate_success(
    check: &Check,
    result: &BumpResult,
    repo: &MockRepository,
    outputs: Option<&WorkflowOutputs>,
) -> std::result::Result<(), String> {
    match check {
        Check::NewVersion { expected } => compare(expected, &result.new_version.to_string()),
        Check::FirstRelease { expected } => {
            compare(&expected.to_string(), &result.first_release.to_string())
        }
        Check::ReleaseBranch { expected, at } => {
            let planned = result.release_branch_to_create.as_ref();
            compare(
                &format!("{:?}", expected),
                &format!("{:?}", planned.map(|p| &p.name)),
            )?;
            match (at, planned) {
                (Some(tag), Some(plan)) => {
                    let tag_commit = resolve_tag(repo, tag)?;
                    compare(tag_commit.as_str(), plan.commit.as_str())
                }
                _ => Ok(()),
            }
        }
        Check::Alias { tag, expected } => {
            let alias = resolve_tag(repo, tag)?;
            let version = resolve_tag(repo, expected)?;
            compare(version.as_str(), alias.as_str())
        }
        Check::TagTarget { tag, commit } => compare(commit, resolve_tag(repo, tag)?.as_str()),
        Check::Output { key, expected } => {
            let actual = outputs
                .and_then(|o| o.get(key.as_str()))
                .ok_or_else(|| format!("output {} was not produced", key.as_str()))?;
            compare(expected, actual)
        }
        Check::Error { .. } => Ok(()),
    }
}

fn resolve_tag<'a>(repo: &'a MockRepository, tag: &str) -> std::result::Result<&'a CommitId, String> {
    repo.tag_target(tag)
        .ok_or_else(|| format!("tag {} does not exist", tag))
}

fn compare(expected: &str, actual: &str) -> std::result::Result<(), String> {
    if expected == actual {
        Ok(())
    } else {
        Err(format!("expected {}, got {}", expected, actual))
    }
}
