//! Execution context threaded through one top-level step invocation.

use super::StepRegistry;
use crate::config::SuiteConfig;
use crate::driver::UiDriver;
use crate::error::StepError;
use serde::Serialize;
use tracing::{debug, debug_span};

/// Deepest supported nesting of composed steps.
pub const MAX_COMPOSITION_DEPTH: usize = 32;

/// One step executed during an invocation, top-level or composed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepInvocation {
    /// Registered name of the step.
    pub name: String,
    /// Argument values, in capture order.
    pub args: Vec<String>,
    /// Nesting depth; zero for the dispatched step itself.
    pub depth: usize,
}

/// State visible to a step handler while it runs.
///
/// A context lives for a single top-level dispatch. Handlers compose further
/// steps through [`StepContext::dispatch`] (by phrase) or
/// [`StepContext::compose`] (by typed call); both run synchronously, in
/// order, and append to the same journal.
pub struct StepContext<'a> {
    registry: &'a StepRegistry,
    suite: &'a SuiteConfig,
    driver: &'a mut dyn UiDriver,
    depth: usize,
    journal: Vec<StepInvocation>,
}

impl<'a> StepContext<'a> {
    /// Create a context over `driver`.
    #[must_use]
    pub fn new(
        registry: &'a StepRegistry,
        suite: &'a SuiteConfig,
        driver: &'a mut dyn UiDriver,
    ) -> Self {
        Self {
            registry,
            suite,
            driver,
            depth: 0,
            journal: Vec::new(),
        }
    }

    /// Suite-wide switches.
    #[must_use]
    pub const fn suite(&self) -> &SuiteConfig {
        self.suite
    }

    /// The UI driver.
    pub fn driver(&mut self) -> &mut (dyn UiDriver + 'a) {
        &mut *self.driver
    }

    /// Current nesting depth.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Steps executed so far, in execution order.
    #[must_use]
    pub fn journal(&self) -> &[StepInvocation] {
        &self.journal
    }

    /// Consume the context, returning its journal.
    #[must_use]
    pub fn into_journal(self) -> Vec<StepInvocation> {
        self.journal
    }

    /// Run the step matching `phrase`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::NoMatch`] when no step matches, or any error
    /// raised by the step.
    pub fn dispatch(&mut self, phrase: &str) -> Result<(), StepError> {
        let registry = self.registry;
        let (definition, args) = registry.resolve(phrase)?;
        self.enter(definition.name(), args.journal_values(), |ctx| {
            definition.invoke(ctx, &args)
        })
    }

    /// Run each non-blank line of `block` as a phrase, stopping at the first
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a line.
    pub fn dispatch_block(&mut self, block: &str) -> Result<(), StepError> {
        block
            .lines()
            .filter(|line| !line.trim().is_empty())
            .try_for_each(|line| self.dispatch(line))
    }

    /// Run `body` as the step `name` with `args`, recording it in the
    /// journal.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::CompositionTooDeep`] past
    /// [`MAX_COMPOSITION_DEPTH`], or any error raised by `body`.
    pub fn compose<F>(&mut self, name: &str, args: &[&str], body: F) -> Result<(), StepError>
    where
        F: FnOnce(&mut Self) -> Result<(), StepError>,
    {
        let values = args.iter().map(|arg| (*arg).to_owned()).collect();
        self.enter(name, values, body)
    }

    fn enter<F>(&mut self, name: &str, args: Vec<String>, body: F) -> Result<(), StepError>
    where
        F: FnOnce(&mut Self) -> Result<(), StepError>,
    {
        if self.depth >= MAX_COMPOSITION_DEPTH {
            return Err(StepError::CompositionTooDeep {
                depth: MAX_COMPOSITION_DEPTH,
                phrase: name.to_owned(),
            });
        }
        let span = debug_span!("step", name, depth = self.depth);
        let _entered = span.enter();
        debug!(?args, "running step");
        self.journal.push(StepInvocation {
            name: name.to_owned(),
            args,
            depth: self.depth,
        });
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }
}
