//! BDD test entry point using rstest-bdd.
//!
//! The `scenarios!` macro generates one test function for each scenario found
//! in the feature files.

mod bdd;

// Re-export fixtures for scenario functions
pub use bdd::fixtures::*;

use rstest_bdd_macros::scenarios;

scenarios!("tests/features", fixtures = [world: TestWorld]);
