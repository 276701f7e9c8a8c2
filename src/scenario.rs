//! Scenario scripts: named, ordered step phrases run fail-fast against one
//! driver.
//!
//! Scripts use a small Gherkin subset:
//!
//! - `Scenario:` opens a new scenario; steps before the first one form an
//!   unnamed scenario.
//! - `Feature:` lines are ignored, as are the free-text description lines
//!   that follow them up to the first scenario or keyword-led step.
//! - Blank lines, `#` comments, and `@` tag lines are skipped.
//! - `Scenario Outline:`, `Scenario Template:`, `Background:`, `Examples:`,
//!   `Scenarios:`, and `Rule:` are rejected with
//!   [`ScriptError::UnsupportedKeyword`].
//! - Any other line is a step phrase.

use crate::driver::UiDriver;
use crate::error::{ScriptError, StepError};
use crate::registry::{Dispatcher, StepInvocation, strip_keyword};
use tracing::{info, info_span, warn};

const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "Scenario Outline:",
    "Scenario Template:",
    "Background:",
    "Examples:",
    "Scenarios:",
    "Rule:",
];

/// A named list of step phrases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    name: String,
    steps: Vec<String>,
}

impl Scenario {
    /// Build a scenario from its name and phrases.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            steps: steps.into_iter().map(Into::into).collect(),
        }
    }

    /// Scenario title; empty for steps that precede any `Scenario:` line.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Step phrases in execution order.
    #[must_use]
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Split a script into scenarios.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::UnsupportedKeyword`] for Gherkin constructs
    /// outside the supported subset.
    ///
    /// # Examples
    ///
    /// ```
    /// use lmis_steps::scenario::Scenario;
    ///
    /// let scenarios = Scenario::parse_all(
    ///     "Feature: Stock\n  Adding drugs\n\n  Scenario: Add\n    Given I have added new drugs\n",
    /// )
    /// .expect("supported script");
    /// assert_eq!(scenarios.len(), 1);
    /// assert_eq!(scenarios[0].name(), "Add");
    /// assert_eq!(scenarios[0].steps(), ["Given I have added new drugs"]);
    /// ```
    pub fn parse_all(text: &str) -> Result<Vec<Self>, ScriptError> {
        let mut scenarios: Vec<Self> = Vec::new();
        let mut in_description = false;
        for (index, line) in text.lines().map(str::trim).enumerate() {
            if line.is_empty() || line.starts_with('#') || line.starts_with('@') {
                continue;
            }
            if let Some(keyword) = UNSUPPORTED_KEYWORDS
                .iter()
                .find(|prefix| line.starts_with(**prefix))
            {
                return Err(ScriptError::UnsupportedKeyword {
                    keyword: keyword.trim_end_matches(':').to_owned(),
                    line: index + 1,
                });
            }
            if line.starts_with("Feature:") {
                in_description = true;
                continue;
            }
            if let Some(title) = line.strip_prefix("Scenario:") {
                in_description = false;
                scenarios.push(Self::new(title.trim(), Vec::<String>::new()));
                continue;
            }
            if in_description {
                if strip_keyword(line) == line {
                    continue;
                }
                in_description = false;
            }
            match scenarios.last_mut() {
                Some(current) => current.steps.push(line.to_owned()),
                None => scenarios.push(Self::new(String::new(), [line])),
            }
        }
        Ok(scenarios)
    }
}

/// One top-level step as it ran, with every step it composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// Phrase as written in the scenario.
    pub phrase: String,
    /// Steps executed for the phrase, including a failing one.
    pub journal: Vec<StepInvocation>,
}

/// How a scenario ended.
#[derive(Debug)]
pub enum ScenarioOutcome {
    /// Every step succeeded.
    Passed,
    /// A step failed and the remaining steps were skipped.
    Failed {
        /// Zero-based index of the failing step.
        step_index: usize,
        /// Phrase of the failing step.
        phrase: String,
        /// Why it failed.
        error: StepError,
    },
}

/// Result of running one [`Scenario`].
#[derive(Debug)]
pub struct ScenarioReport {
    /// Scenario title.
    pub name: String,
    /// Final outcome.
    pub outcome: ScenarioOutcome,
    /// Executed top-level steps in order.
    pub steps: Vec<StepRecord>,
}

impl ScenarioReport {
    /// Whether every step succeeded.
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self.outcome, ScenarioOutcome::Passed)
    }
}

/// Runs scenarios through a [`Dispatcher`].
#[derive(Debug, Clone, Copy)]
pub struct ScenarioRunner<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> ScenarioRunner<'a> {
    /// Run scenarios with `dispatcher`'s steps and suite configuration.
    #[must_use]
    pub const fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Run each step of `scenario` in order, stopping at the first failure.
    ///
    /// Every step gets a fresh context; only the driver is shared.
    pub fn run(&self, scenario: &Scenario, driver: &mut dyn UiDriver) -> ScenarioReport {
        let span = info_span!("scenario", name = scenario.name());
        let _entered = span.enter();
        let mut steps = Vec::with_capacity(scenario.steps().len());
        for (step_index, phrase) in scenario.steps().iter().enumerate() {
            let mut ctx = self.dispatcher.context(&mut *driver);
            let result = ctx.dispatch(phrase);
            steps.push(StepRecord {
                phrase: phrase.clone(),
                journal: ctx.into_journal(),
            });
            if let Err(error) = result {
                warn!(step_index, %phrase, %error, "scenario failed");
                return ScenarioReport {
                    name: scenario.name().to_owned(),
                    outcome: ScenarioOutcome::Failed {
                        step_index,
                        phrase: phrase.clone(),
                        error,
                    },
                    steps,
                };
            }
        }
        info!(steps = steps.len(), "scenario passed");
        ScenarioReport {
            name: scenario.name().to_owned(),
            outcome: ScenarioOutcome::Passed,
            steps,
        }
    }

    /// Run every scenario against the same driver.
    pub fn run_all(
        &self,
        scenarios: &[Scenario],
        driver: &mut dyn UiDriver,
    ) -> Vec<ScenarioReport> {
        scenarios
            .iter()
            .map(|scenario| self.run(scenario, &mut *driver))
            .collect()
    }
}
