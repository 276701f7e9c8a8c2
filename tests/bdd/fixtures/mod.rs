//! Fixture modules for BDD scenarios.
//!
//! The `TestWorld` struct holds all state for BDD scenarios. Non-Clone types
//! use `RefCell` directly, while Clone types use `Slot<T>`.

// The `#[fixture]` macro generates types that cannot have doc comments attached
#![allow(
    missing_docs,
    reason = "Generated fixture types cannot have doc comments attached"
)]

use lmis_steps::config::SuiteConfig;
use lmis_steps::driver::RecordingDriver;
use lmis_steps::registry::StepInvocation;
use rstest::fixture;
use rstest_bdd::Slot;
use std::cell::RefCell;

/// Combined test world for all BDD scenarios.
#[derive(Default)]
pub struct TestWorld {
    /// Suite switches for the scenario.
    pub suite: Slot<SuiteConfig>,
    /// Scripted device shared by every dispatch in the scenario.
    pub driver: RefCell<RecordingDriver>,
    /// Journal of the last dispatch, including a failing one.
    pub journal: Slot<Vec<StepInvocation>>,
    /// Rendered error from the last dispatch.
    pub dispatch_error: Slot<String>,
    /// Rendered error from the last registration attempt.
    pub registration_error: Slot<String>,
}

/// Fixture providing a fresh `TestWorld` for each scenario.
#[fixture]
pub fn world() -> TestWorld {
    TestWorld::default()
}
