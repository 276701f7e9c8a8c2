//! Error types for the runner module.
//!
//! This submodule isolates derive-macro-affected code to scope lint suppressions
//! narrowly. The `unused_assignments` lint fires in some Rust versions due to
//! thiserror/miette derive macro expansion.

// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised during command execution.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The script contained no step lines.
    #[error("no scenarios found in {}", path.display())]
    #[diagnostic(
        code(lmis_steps::runner::no_scenarios),
        help("add at least one step phrase, optionally under a `Scenario:` heading")
    )]
    NoScenarios {
        /// Script that was read.
        path: PathBuf,
    },

    /// At least one scenario failed.
    #[error("{failed} of {total} scenarios failed")]
    #[diagnostic(code(lmis_steps::runner::scenarios_failed))]
    ScenariosFailed {
        /// Failed scenario count.
        failed: usize,
        /// Scenarios run.
        total: usize,
    },
}
