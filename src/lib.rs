pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fixture;
pub mod git;
pub mod outputs;
pub mod release;
pub mod ui;

pub use error::{GitBumpError, Result};
