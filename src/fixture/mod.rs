//! Declarative release scenarios.
//!
//! A scenario describes a commit graph with branches and tags, one bump
//! request, and checks on the outcome. Scenarios are JSON documents with a
//! closed schema: unknown fields, bump types, check kinds and output keys are
//! rejected when the document is parsed.
//!
//! ```
//! use git_bump::fixture::{run_scenario, Scenario};
//!
//! let scenario = Scenario::from_json(r#"{
//!     "name": "first release",
//!     "repository": {"commits": [{"id": "c1"}], "branches": {"main": "c1"}},
//!     "request": {"bump_type": "minor", "target_branch": "main"},
//!     "checks": [{"kind": "new_version", "expected": "v0.1.0"}]
//! }"#).unwrap();
//!
//! assert!(run_scenario(&scenario).unwrap().passed());
//! ```

mod runner;
mod scenario;

pub use runner::{run_scenario, CheckOutcome, ScenarioReport};
pub use scenario::{Check, CommitFixture, OutputKey, RepositoryFixture, RequestFixture, Scenario};
