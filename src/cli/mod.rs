//! Command line interface module
//!
//! Argument parsing and the runner that drives the report workflows.

pub mod args;
pub mod runner;

pub use args::{Args, Command};
pub use runner::Runner;
