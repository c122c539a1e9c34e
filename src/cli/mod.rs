pub mod orchestration;

pub use orchestration::{
    run_bump_workflow, run_release_workflow, run_status, run_verify, AliasStatus,
    BumpWorkflowArgs, ReleaseBranchStatus, ReleaseWorkflowArgs, StatusReport, WorkflowResult,
};
