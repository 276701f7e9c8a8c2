//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! handles command execution. Scenario scripts run against a
//! [`RecordingDriver`], so `run` is always a dry run.

mod error;

pub use error::RunnerError;

use crate::cli::{Cli, Commands, RunArgs};
use crate::config::{ConfigProvider, EnvConfig, SuiteConfig};
use crate::driver::{RecordingDriver, selector};
use crate::registry::{Dispatcher, StepRegistry};
use crate::scenario::{Scenario, ScenarioOutcome, ScenarioReport, ScenarioRunner};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use tracing::{debug, info};

/// Execute the parsed [`Cli`] command, writing its output to stdout.
///
/// # Errors
///
/// Returns an error if the catalogue fails to register, output cannot be
/// written, the script cannot be read or parsed, or a scenario fails.
pub fn run(cli: &Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_writer(cli, &mut out)
}

/// Execute the parsed [`Cli`] command, writing its output to `out`.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_writer<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let suite = cli.suite_config();
    let dispatcher = Dispatcher::with_catalog(suite).context("register step catalogue")?;
    debug!(steps = dispatcher.registry().len(), ?suite, "catalogue ready");
    match cli.command.clone().unwrap_or(Commands::Steps) {
        Commands::Steps => write_steps(dispatcher.registry(), out),
        Commands::Config => write_config(&suite, out),
        Commands::Run(args) => run_script(&dispatcher, &args, out),
    }
}

fn write_steps<W: Write>(registry: &StepRegistry, out: &mut W) -> Result<()> {
    let width = registry
        .definitions()
        .map(|definition| definition.name().len())
        .max()
        .unwrap_or_default();
    for definition in registry.definitions() {
        writeln!(
            out,
            "{:<width$}  {}",
            definition.name(),
            definition.pattern().as_str()
        )
        .context("write step listing")?;
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigView<'a> {
    #[serde(flatten)]
    suite: &'a SuiteConfig,
    env: &'static EnvConfig,
}

fn write_config<W: Write>(suite: &SuiteConfig, out: &mut W) -> Result<()> {
    let view = ConfigView {
        suite,
        env: suite.env_config(),
    };
    serde_json::to_writer_pretty(&mut *out, &view).context("serialise configuration")?;
    writeln!(out).context("write configuration")?;
    Ok(())
}

/// Scripted device for dry runs.
///
/// The search bar is always shown so search steps can focus it; `--present`
/// selectors answer every query with one element and `--visible` text is
/// reported as shown.
fn dry_run_driver(args: &RunArgs) -> RecordingDriver {
    let mut driver = RecordingDriver::new();
    driver.present(selector::search_bar(), 1);
    for present in &args.present {
        driver.present(present, 1);
    }
    for text in &args.visible {
        driver.show_text(text.as_str());
    }
    driver
}

fn run_script<W: Write>(dispatcher: &Dispatcher, args: &RunArgs, out: &mut W) -> Result<()> {
    let script = fs::read_to_string(&args.file)
        .with_context(|| format!("read scenario script {}", args.file.display()))?;
    let scenarios = Scenario::parse_all(&script)
        .with_context(|| format!("parse scenario script {}", args.file.display()))?;
    if scenarios.is_empty() {
        return Err(RunnerError::NoScenarios {
            path: args.file.clone(),
        }
        .into());
    }
    info!(path = %args.file.display(), scenarios = scenarios.len(), "running script");

    let mut driver = dry_run_driver(args);
    let reports = ScenarioRunner::new(dispatcher).run_all(&scenarios, &mut driver);
    let total = reports.len();
    let failed = reports.iter().filter(|report| !report.passed()).count();
    for report in reports {
        write_report(report, out)?;
    }
    writeln!(out, "transcript:").context("write transcript")?;
    for call in driver.calls() {
        writeln!(out, "  {call}").context("write transcript")?;
    }
    writeln!(out, "{} passed, {failed} failed", total - failed).context("write summary")?;

    if failed > 0 {
        return Err(RunnerError::ScenariosFailed { failed, total }.into());
    }
    Ok(())
}

fn write_report<W: Write>(report: ScenarioReport, out: &mut W) -> Result<()> {
    let name = if report.name.is_empty() {
        "(unnamed)"
    } else {
        report.name.as_str()
    };
    match report.outcome {
        ScenarioOutcome::Passed => {
            writeln!(out, "PASS {name} ({} steps)", report.steps.len())
                .context("write scenario result")?;
        }
        ScenarioOutcome::Failed {
            step_index,
            phrase,
            error,
        } => {
            writeln!(out, "FAIL {name} at step {}: {phrase}", step_index + 1)
                .context("write scenario result")?;
            writeln!(out, "{:?}", miette::Report::new(error)).context("write diagnostic")?;
        }
    }
    Ok(())
}
