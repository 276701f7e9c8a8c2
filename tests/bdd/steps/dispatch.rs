//! Step definitions for catalogue dispatch scenarios.
//!
//! Phrases run against the world's [`RecordingDriver`]; the resulting journal
//! and any error are stored in [`TestWorld`] for downstream assertions.

use crate::bdd::fixtures::TestWorld;
use anyhow::{Context, Result, ensure};
use lmis_steps::config::SuiteConfig;
use lmis_steps::driver::{DriverCall, RecordingDriver, selector};
use lmis_steps::registry::{Dispatcher, StepInvocation};
use lmis_steps::steps;
use rstest_bdd_macros::{given, then, when};

const NEW_DRUG_FNM: &str = "08S01ZY";

fn prepare(world: &TestWorld, suite: SuiteConfig) {
    world.suite.set(suite);
    let mut driver = RecordingDriver::new();
    driver.present(selector::search_bar(), 1);
    driver.present(selector::with_text(NEW_DRUG_FNM), 1);
    *world.driver.borrow_mut() = driver;
}

fn journal(world: &TestWorld) -> Result<Vec<StepInvocation>> {
    world.journal.get().context("no phrase has been dispatched")
}

fn split_list(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a normal suite")]
fn normal_suite(world: &TestWorld) {
    prepare(world, SuiteConfig::default());
}

#[given("a stress suite")]
fn stress_suite(world: &TestWorld) {
    prepare(world, SuiteConfig::default().with_stress_test(true));
}

#[given("the device lists an unticked product once")]
fn unticked_product_once(world: &TestWorld) {
    world
        .driver
        .borrow_mut()
        .respond(selector::unchecked_product_checkbox(), 1);
}

#[given("the device always lists an unticked product")]
fn unticked_product_always(world: &TestWorld) {
    world
        .driver
        .borrow_mut()
        .present(selector::unchecked_product_checkbox(), 1);
}

#[given("the device lists product names")]
fn product_names_listed(world: &TestWorld) {
    world
        .driver
        .borrow_mut()
        .present(selector::product_name(), 1);
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("I dispatch: {phrase}")]
fn dispatch_phrase(world: &TestWorld, phrase: String) -> Result<()> {
    let suite = world.suite.get().context("suite has not been configured")?;
    let dispatcher = Dispatcher::with_catalog(suite)?;
    let mut driver = world.driver.borrow_mut();
    let mut ctx = dispatcher.context(&mut *driver);
    let outcome = ctx.dispatch(&phrase);
    world.journal.set(ctx.into_journal());
    match outcome {
        Ok(()) => world.dispatch_error.clear(),
        Err(err) => world.dispatch_error.set(err.to_string()),
    }
    Ok(())
}

#[when("the catalogue is registered twice")]
fn register_catalogue_twice(world: &TestWorld) -> Result<()> {
    let mut registry = steps::catalog()?;
    match steps::register(&mut registry) {
        Ok(()) => world.registration_error.clear(),
        Err(err) => world.registration_error.set(err.to_string()),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the step succeeds")]
fn step_succeeds(world: &TestWorld) -> Result<()> {
    ensure!(
        !world.dispatch_error.is_filled(),
        "step failed: {:?}",
        world.dispatch_error.get()
    );
    Ok(())
}

#[then("the step fails with {message:string}")]
fn step_fails_with(world: &TestWorld, message: String) -> Result<()> {
    let actual = world
        .dispatch_error
        .get()
        .context("step should have failed")?;
    ensure!(actual == message, "expected '{message}', got '{actual}'");
    Ok(())
}

#[then("the journal runs {names:string}")]
fn journal_runs(world: &TestWorld, names: String) -> Result<()> {
    let journal = journal(world)?;
    let actual: Vec<&str> = journal.iter().map(|step| step.name.as_str()).collect();
    ensure!(
        actual == split_list(&names),
        "unexpected journal {actual:?}"
    );
    Ok(())
}

#[then("step {name:string} ran with {args:string}")]
fn step_ran_with(world: &TestWorld, name: String, args: String) -> Result<()> {
    let journal = journal(world)?;
    let runs: Vec<&StepInvocation> = journal.iter().filter(|step| step.name == name).collect();
    ensure!(runs.len() == 1, "expected one {name} run, got {runs:?}");
    let actual: Vec<&str> = runs
        .iter()
        .flat_map(|step| step.args.iter().map(String::as_str))
        .collect();
    ensure!(
        actual == split_list(&args),
        "{name} ran with {actual:?}"
    );
    Ok(())
}

#[then("{count:usize} quantities were entered")]
fn quantities_entered(world: &TestWorld, count: usize) -> Result<()> {
    let field = selector::inventory_quantity().to_string();
    let entered = world
        .driver
        .borrow()
        .calls()
        .iter()
        .filter(|call| matches!(call, DriverCall::EnterText { selector, .. } if *selector == field))
        .count();
    ensure!(entered == count, "expected {count} entries, got {entered}");
    Ok(())
}

#[then("registration fails with {message:string}")]
fn registration_fails_with(world: &TestWorld, message: String) -> Result<()> {
    let actual = world
        .registration_error
        .get()
        .context("registration should have failed")?;
    ensure!(actual == message, "expected '{message}', got '{actual}'");
    Ok(())
}
