//! Pure formatting functions for UI output.
//!
//! Human-facing messages go to stderr so that stdout carries only the
//! `KEY=value` outputs of `bump` and `release`. The `format_*` functions
//! build the text; the `display_*` functions print it.

use crate::boundary::BoundaryWarning;
use crate::cli::StatusReport;
use crate::engine::BumpResult;
use crate::fixture::ScenarioReport;
use crate::outputs::WorkflowOutputs;
use crate::release::ApplyReport;
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().for_stderr(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green().for_stderr(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow().for_stderr(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow().for_stderr(), warning);
}

/// Describe the computed release: version change, alias move and release branch.
pub fn format_bump_result(result: &BumpResult) -> String {
    let mut lines = Vec::new();

    match result.previous_version {
        Some(previous) => {
            lines.push(format!(
                "{}",
                style(format!("Proposed release on '{}':", result.target_branch)).bold()
            ));
            lines.push(format!("  From: {}", style(previous).red()));
            lines.push(format!("  To:   {}", style(result.new_version).green()));
        }
        None => {
            lines.push(format!(
                "{}",
                style(format!("First release on '{}':", result.target_branch)).bold()
            ));
            lines.push(format!("  New version: {}", style(result.new_version).green()));
        }
    }

    let alias = &result.major_alias;
    let alias_line = match &alias.previous_commit {
        Some(previous) if alias.is_noop() => {
            format!("  Alias: {} stays at {}", alias.name, previous.short())
        }
        Some(previous) => format!(
            "  Alias: {} moves {} -> {}",
            alias.name,
            previous.short(),
            alias.commit.short()
        ),
        None => format!("  Alias: {} created at {}", alias.name, alias.commit.short()),
    };
    lines.push(alias_line);

    if let Some(plan) = &result.release_branch_to_create {
        lines.push(format!(
            "  Release branch: {} at {} ({})",
            style(&plan.name).cyan(),
            plan.commit.short(),
            plan.from_version
        ));
    }

    lines.join("\n")
}

pub fn display_bump_result(result: &BumpResult) {
    eprintln!("\n{}", format_bump_result(result));
}

/// List what a release did, or would do for a dry run
pub fn format_actions(report: &ApplyReport) -> String {
    let header = if report.dry_run {
        "Dry run, no refs were written:"
    } else {
        "Release refs:"
    };
    let mut lines = vec![format!("{}", style(header).bold())];
    for action in &report.actions {
        let marker = if action.changes_refs() {
            style("+").green()
        } else {
            style("=").dim()
        };
        lines.push(format!("  {} {}", marker, action));
    }
    lines.join("\n")
}

pub fn display_actions(report: &ApplyReport) {
    eprintln!("\n{}", format_actions(report));
}

/// Print outputs as `KEY=value` lines on stdout
pub fn display_outputs(outputs: &WorkflowOutputs) {
    print!("{}", outputs.to_lines());
}

/// Display the git command that publishes the release refs later.
pub fn display_manual_push_instruction(refspecs: &[String], remote: &str) {
    eprintln!(
        "\n{} To push these refs later, run:\n  {}",
        style("→").yellow().for_stderr(),
        style(format!("git push {} {}", remote, refspecs.join(" ")))
            .cyan()
            .for_stderr()
    );
}

pub fn format_status_report(report: &StatusReport) -> String {
    let mut lines = vec![format!(
        "{} {}",
        style("Line state:").bold(),
        report.line_state
    )];

    if let Some(version) = &report.latest_version {
        lines.push(format!("Latest version: {}", style(version).green()));
    }
    if let Some(branch) = &report.current_branch {
        lines.push(format!("Current branch: {}", branch));
    }

    lines.push(format!("{}", style("Major aliases:").bold()));
    if report.aliases.is_empty() {
        lines.push("  (none)".to_string());
    }
    for alias in &report.aliases {
        let target = match &alias.version {
            Some(version) => version.to_string(),
            None => format!("{} (no version tag)", alias.commit.short()),
        };
        lines.push(format!("  {} -> {}", alias.name, target));
    }

    lines.push(format!("{}", style("Release branches:").bold()));
    if report.release_branches.is_empty() {
        lines.push("  (none)".to_string());
    }
    for branch in &report.release_branches {
        let latest = branch
            .latest_version
            .map(|v| v.to_string())
            .unwrap_or_else(|| "no release yet".to_string());
        lines.push(format!("  {} ({})", branch.name, latest));
    }

    for warning in &report.warnings {
        lines.push(format!("{} {}", style("⚠").yellow(), warning));
    }

    lines.join("\n")
}

pub fn display_status_report(report: &StatusReport) {
    println!("{}", format_status_report(report));
}

pub fn format_scenario_report(report: &ScenarioReport) -> String {
    let mut lines = Vec::new();
    let verdict = if report.passed() {
        style("PASS").green()
    } else {
        style("FAIL").red()
    };
    lines.push(format!("{} {}", verdict, report.name));

    for outcome in &report.checks {
        if outcome.passed {
            lines.push(format!("  {} {}", style("✓").green(), outcome.check));
        } else {
            lines.push(format!(
                "  {} {}: {}",
                style("✗").red(),
                outcome.check,
                outcome.detail
            ));
        }
    }
    lines.join("\n")
}

pub fn display_scenario_report(report: &ScenarioReport) {
    println!("{}", format_scenario_report(report));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Branch, BumpType, CommitId, RepositorySnapshot, Tag};
    use crate::engine::{BumpRequest, VersionEngine};
    use crate::release::RefAction;

    fn major_on_main() -> BumpResult {
        let snapshot = RepositorySnapshot::new(
            vec![Tag::new("v1.2.0", "aaaaaaaaaa"), Tag::new("v1", "aaaaaaaaaa")],
            vec![Branch::new("main", "bbbbbbbbbb")],
            Some("main".to_string()),
        )
        .with_reachable("main", ["aaaaaaaaaa", "bbbbbbbbbb"].map(CommitId::from));
        VersionEngine::default()
            .compute(&snapshot, &BumpRequest::new(BumpType::Major, "main"))
            .unwrap()
    }

    #[test]
    fn test_format_bump_result() {
        let text = format_bump_result(&major_on_main());
        assert!(text.contains("v1.2.0"));
        assert!(text.contains("v2.0.0"));
        assert!(text.contains("Alias: v2 created at bbbbbbb"));
        assert!(text.contains("release/v1"));
    }

    #[test]
    fn test_format_actions_dry_run() {
        let report = ApplyReport {
            actions: vec![
                RefAction::CreateTag {
                    name: "v2.0.0".to_string(),
                    commit: CommitId::from("bbbbbbbbbb"),
                },
                RefAction::KeepAlias {
                    name: "v2".to_string(),
                },
            ],
            pushed: Vec::new(),
            dry_run: true,
            major_version: "v2".to_string(),
        };
        let text = format_actions(&report);
        assert!(text.contains("Dry run"));
        assert!(text.contains("create tag v2.0.0 at bbbbbbb"));
        assert!(text.contains("alias v2 already in place"));
    }

    #[test]
    fn test_display_error() {
        // Visual verification test - output is printed to stderr
        display_error("test error");
    }
}
