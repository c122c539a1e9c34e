//! Multi-step release histories driven through the release workflow against
//! an in-memory repository.

use git_bump::cli::{run_bump_workflow, run_release_workflow, BumpWorkflowArgs, ReleaseWorkflowArgs};
use git_bump::config::Config;
use git_bump::domain::{BumpType, CommitId, RepositorySnapshot};
use git_bump::engine::{BumpRequest, VersionEngine};
use git_bump::error::ErrorKind;
use git_bump::git::{MockRepository, Repository};
use git_bump::outputs::{CURRENT_MAJOR, FIRST_RELEASE, MAJOR_VERSION, NEW_VERSION};

fn config() -> Config {
    let mut config = Config::default();
    config.outputs.github_output = false;
    config
}

fn release_args(bump_type: BumpType, branch: &str) -> ReleaseWorkflowArgs {
    ReleaseWorkflowArgs {
        bump_type,
        branch: Some(branch.to_string()),
        push: false,
        dry_run: false,
        force: true,
    }
}

fn release(repo: &mut MockRepository, bump_type: BumpType, branch: &str) -> String {
    let result = run_release_workflow(repo, &release_args(bump_type, branch), &config(), |_| {
        panic!("forced releases never prompt")
    })
    .unwrap()
    .unwrap();
    result.bump.new_version.to_string()
}

fn commit(repo: &mut MockRepository, id: &str, branch: &str) {
    let parent = repo.branch_head(branch).unwrap().as_str().to_string();
    repo.add_commit(id, &[parent.as_str()]);
    repo.set_branch_head(branch, id);
}

#[test]
fn test_release_history_across_major_lines() {
    let mut repo = MockRepository::new();
    repo.add_commit("c1", &[]);
    repo.set_branch_head("main", "c1");
    repo.checkout("main");

    assert_eq!(release(&mut repo, BumpType::Minor, "main"), "v0.1.0");
    commit(&mut repo, "c2", "main");
    assert_eq!(release(&mut repo, BumpType::Patch, "main"), "v0.1.1");
    commit(&mut repo, "c3", "main");
    assert_eq!(release(&mut repo, BumpType::Major, "main"), "v1.0.0");
    assert_eq!(repo.branch_head("release/v0"), None);
    assert_eq!(repo.tag_target("v0"), Some(&CommitId::from("c2")));

    commit(&mut repo, "c4", "main");
    assert_eq!(release(&mut repo, BumpType::Minor, "main"), "v1.1.0");
    commit(&mut repo, "c5", "main");
    assert_eq!(release(&mut repo, BumpType::Major, "main"), "v2.0.0");
    assert_eq!(repo.branch_head("release/v1"), Some(&CommitId::from("c4")));
    assert_eq!(repo.tag_target("v1"), Some(&CommitId::from("c4")));
    assert_eq!(repo.tag_target("v2"), Some(&CommitId::from("c5")));

    commit(&mut repo, "c6", "release/v1");
    assert_eq!(release(&mut repo, BumpType::Patch, "release/v1"), "v1.1.1");
    assert_eq!(repo.tag_target("v1"), Some(&CommitId::from("c6")));
    assert_eq!(repo.tag_target("v2"), Some(&CommitId::from("c5")));

    commit(&mut repo, "c7", "main");
    assert_eq!(release(&mut repo, BumpType::Minor, "main"), "v2.1.0");
}

#[test]
fn test_release_outputs() {
    let mut repo = MockRepository::new();
    repo.add_linear_history(&["c1", "c2"]);
    repo.set_branch_head("main", "c2");
    repo.add_tag("v1.2.0", "c1");
    repo.add_tag("v1", "c1");

    let result = run_release_workflow(
        &mut repo,
        &release_args(BumpType::Major, "main"),
        &config(),
        |_| Ok(true),
    )
    .unwrap()
    .unwrap();

    assert_eq!(result.outputs.get(NEW_VERSION), Some("v2.0.0"));
    assert_eq!(result.outputs.get(FIRST_RELEASE), Some("false"));
    assert_eq!(result.outputs.get(CURRENT_MAJOR), Some("1"));
    assert_eq!(result.outputs.get(MAJOR_VERSION), Some("v2"));
    assert!(!result.github_output_written);
}

#[test]
fn test_bump_changes_nothing() {
    let mut repo = MockRepository::new();
    repo.add_linear_history(&["c1", "c2"]);
    repo.set_branch_head("main", "c2");
    repo.add_tag("v1.2.0", "c1");
    repo.checkout("main");

    let before = repo.list_tags().unwrap();
    let args = BumpWorkflowArgs {
        bump_type: BumpType::Minor,
        branch: None,
    };
    let result = run_bump_workflow(&repo, &args, &config()).unwrap();

    assert_eq!(result.bump.new_version.to_string(), "v1.3.0");
    assert_eq!(result.outputs.get(MAJOR_VERSION), None);
    assert!(result.applied.is_none());
    assert_eq!(repo.list_tags().unwrap(), before);
}

#[test]
fn test_dry_run_release_writes_nothing() {
    let mut repo = MockRepository::new();
    repo.add_linear_history(&["c1", "c2"]);
    repo.set_branch_head("main", "c2");
    repo.add_tag("v1.0.0", "c1");

    let mut args = release_args(BumpType::Major, "main");
    args.dry_run = true;
    args.force = false;
    args.push = true;

    let result = run_release_workflow(&mut repo, &args, &config(), |_| {
        panic!("dry runs never prompt")
    })
    .unwrap()
    .unwrap();

    let report = result.applied.unwrap();
    assert!(report.dry_run);
    assert_eq!(report.actions.len(), 3);
    assert_eq!(repo.tag_target("v2.0.0"), None);
    assert_eq!(repo.branch_head("release/v1"), None);
    assert!(repo.pushed().is_empty());
}

#[test]
fn test_declined_prompt_cancels_release() {
    let mut repo = MockRepository::new();
    repo.add_linear_history(&["c1", "c2"]);
    repo.set_branch_head("main", "c2");
    repo.add_tag("v1.0.0", "c1");
    repo.add_tag("v1", "c1");

    let mut args = release_args(BumpType::Patch, "main");
    args.force = false;

    let mut prompts = Vec::new();
    let outcome = run_release_workflow(&mut repo, &args, &config(), |prompt| {
        prompts.push(prompt.to_string());
        Ok(false)
    })
    .unwrap();

    assert!(outcome.is_none());
    assert_eq!(prompts, vec!["Release v1.0.1 on 'main'?".to_string()]);
    assert_eq!(repo.tag_target("v1.0.1"), None);
    assert_eq!(repo.tag_target("v1"), Some(&CommitId::from("c1")));
}

#[test]
fn test_second_release_of_same_commit_is_refused() {
    let mut repo = MockRepository::new();
    repo.add_linear_history(&["c1", "c2"]);
    repo.set_branch_head("main", "c2");
    repo.add_tag("v1.0.0", "c1");
    repo.add_tag("v1", "c1");

    assert_eq!(release(&mut repo, BumpType::Patch, "main"), "v1.0.1");
    let tags = repo.list_tags().unwrap();

    for bump in [BumpType::Patch, BumpType::Minor, BumpType::Major] {
        let err = run_release_workflow(&mut repo, &release_args(bump, "main"), &config(), |_| {
            panic!("forced releases never prompt")
        })
        .unwrap_err();
        assert!(err.to_string().contains("already released as v1.0.1"), "{}", err);
    }

    // an interactive run is refused before it asks
    let mut args = release_args(BumpType::Patch, "main");
    args.force = false;
    assert!(run_release_workflow(&mut repo, &args, &config(), |_| {
        panic!("refused before the prompt")
    })
    .is_err());

    assert_eq!(repo.list_tags().unwrap(), tags);
    assert_eq!(repo.branch_head("release/v1"), None);

    // the repository is still in a state the next bump accepts
    commit(&mut repo, "c3", "main");
    assert_eq!(release(&mut repo, BumpType::Patch, "main"), "v1.0.2");
}

#[test]
fn test_push_uses_configured_remote() {
    let mut repo = MockRepository::new();
    repo.add_linear_history(&["c1", "c2"]);
    repo.set_branch_head("main", "c2");
    repo.add_tag("v1.0.0", "c1");
    repo.add_tag("v1", "c1");

    let mut config = config();
    config.repository.remote = "upstream".to_string();
    config.release.push = true;

    run_release_workflow(&mut repo, &release_args(BumpType::Patch, "main"), &config, |_| {
        Ok(true)
    })
    .unwrap()
    .unwrap();

    let pushed = repo.pushed();
    assert_eq!(pushed.len(), 2);
    assert!(pushed.iter().all(|(remote, _)| remote == "upstream"));
}

#[test]
fn test_duplicate_tags_succeed_after_deleting_one() {
    let mut repo = MockRepository::new();
    repo.add_linear_history(&["c1", "c2"]);
    repo.set_branch_head("main", "c2");
    repo.add_tag("v1.0.0", "c1");
    repo.add_tag("v1.0.1", "c1");
    repo.add_tag("v1", "c1");

    let engine = VersionEngine::default();
    let request = BumpRequest::new(BumpType::Patch, "main");

    let snapshot = RepositorySnapshot::capture(&repo, "main", Some("main")).unwrap();
    let err = engine.compute(&snapshot, &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateOrAmbiguousTag);

    repo.delete_tag("v1.0.1").unwrap();
    let snapshot = RepositorySnapshot::capture(&repo, "main", Some("main")).unwrap();
    let result = engine.compute(&snapshot, &request).unwrap();
    assert_eq!(result.new_version.to_string(), "v1.0.1");
}

#[test]
fn test_compute_is_idempotent() {
    let mut repo = MockRepository::new();
    repo.add_linear_history(&["c1", "c2", "c3"]);
    repo.set_branch_head("main", "c3");
    repo.add_tag("v0.3.0", "c2");

    let snapshot = RepositorySnapshot::capture(&repo, "main", Some("main")).unwrap();
    let engine = VersionEngine::default();
    for bump in [BumpType::Major, BumpType::Minor, BumpType::Patch] {
        let request = BumpRequest::new(bump, "main");
        assert_eq!(
            engine.compute(&snapshot, &request).unwrap(),
            engine.compute(&snapshot, &request).unwrap()
        );
    }
}
