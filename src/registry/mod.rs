//! Step registry and dispatcher.
//!
//! Steps are registered under a regular-expression pattern and looked up by
//! phrase. Registration order is significant: when several patterns match a
//! phrase, the earliest registration wins and the ambiguity is logged.

mod args;
mod context;
mod pattern;

pub use args::StepArgs;
pub use context::{MAX_COMPOSITION_DEPTH, StepContext, StepInvocation};
pub use pattern::{StepPattern, strip_keyword};

use crate::config::SuiteConfig;
use crate::driver::UiDriver;
use crate::error::StepError;
use indexmap::IndexMap;
use indexmap::map::Entry;
use itertools::Itertools;
use std::fmt;
use tracing::{debug, warn};

/// Boxed step body.
pub type StepHandler =
    Box<dyn Fn(&mut StepContext<'_>, &StepArgs) -> Result<(), StepError> + Send + Sync>;

/// A named pattern and the handler it dispatches to.
pub struct StepDefinition {
    name: String,
    pattern: StepPattern,
    handler: StepHandler,
}

impl StepDefinition {
    /// Registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compiled pattern.
    #[must_use]
    pub const fn pattern(&self) -> &StepPattern {
        &self.pattern
    }

    pub(crate) fn invoke(
        &self,
        ctx: &mut StepContext<'_>,
        args: &StepArgs,
    ) -> Result<(), StepError> {
        (self.handler)(ctx, args)
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Ordered table of step definitions keyed by pattern source.
#[derive(Debug, Default)]
pub struct StepRegistry {
    definitions: IndexMap<String, StepDefinition>,
}

impl StepRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` as step `name` under `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::DuplicatePattern`] when `pattern` is already
    /// registered and [`StepError::InvalidPattern`] when it does not compile.
    ///
    /// # Examples
    ///
    /// ```
    /// use lmis_steps::registry::StepRegistry;
    ///
    /// let mut registry = StepRegistry::new();
    /// registry
    ///     .register("greet", r#"^I greet "(.*?)"$"#, |_ctx, _args| Ok(()))
    ///     .expect("first registration");
    /// assert!(registry
    ///     .register("greet_again", r#"^I greet "(.*?)"$"#, |_ctx, _args| Ok(()))
    ///     .is_err());
    /// ```
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        pattern: &str,
        handler: F,
    ) -> Result<(), StepError>
    where
        F: Fn(&mut StepContext<'_>, &StepArgs) -> Result<(), StepError> + Send + Sync + 'static,
    {
        let Entry::Vacant(slot) = self.definitions.entry(pattern.to_owned()) else {
            return Err(StepError::DuplicatePattern {
                pattern: pattern.to_owned(),
            });
        };
        let definition = StepDefinition {
            name: name.into(),
            pattern: StepPattern::new(pattern)?,
            handler: Box::new(handler),
        };
        debug!(name = definition.name(), pattern, "registered step");
        slot.insert(definition);
        Ok(())
    }

    /// Number of registered steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no steps are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &StepDefinition> {
        self.definitions.values()
    }

    /// Find the definition for `phrase` and capture its arguments.
    ///
    /// A leading Gherkin keyword is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::NoMatch`] when no pattern matches.
    pub fn resolve(&self, phrase: &str) -> Result<(&StepDefinition, StepArgs), StepError> {
        let text = strip_keyword(phrase);
        let no_match = || StepError::NoMatch {
            phrase: phrase.trim().to_owned(),
        };
        if text.is_empty() {
            return Err(no_match());
        }
        let mut matches = self.definitions.values().filter_map(|definition| {
            definition
                .pattern
                .captures(&definition.name, text)
                .map(|args| (definition, args))
        });
        let first = matches.next().ok_or_else(no_match)?;
        let shadowed = matches.map(|(definition, _)| definition.name()).join(", ");
        if !shadowed.is_empty() {
            warn!(
                step = first.0.name(),
                %shadowed,
                phrase = text,
                "phrase matches several steps; using the first registered"
            );
        }
        Ok(first)
    }
}

/// Registry plus suite configuration, ready to run phrases.
#[derive(Debug)]
pub struct Dispatcher {
    registry: StepRegistry,
    suite: SuiteConfig,
}

impl Dispatcher {
    /// Pair `registry` with the run's `suite` configuration.
    #[must_use]
    pub const fn new(registry: StepRegistry, suite: SuiteConfig) -> Self {
        Self { registry, suite }
    }

    /// Build a dispatcher over the full step catalogue.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalogue fails to register.
    pub fn with_catalog(suite: SuiteConfig) -> Result<Self, StepError> {
        Ok(Self::new(crate::steps::catalog()?, suite))
    }

    /// The step table.
    #[must_use]
    pub const fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Suite-wide switches.
    #[must_use]
    pub const fn suite(&self) -> &SuiteConfig {
        &self.suite
    }

    /// Open a fresh context over `driver`.
    pub fn context<'a>(&'a self, driver: &'a mut dyn UiDriver) -> StepContext<'a> {
        StepContext::new(&self.registry, &self.suite, driver)
    }

    /// Run the step matching `phrase`, returning the journal of every step
    /// it executed.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::NoMatch`] when no step matches, or the first
    /// error raised while the step ran.
    pub fn dispatch(
        &self,
        driver: &mut dyn UiDriver,
        phrase: &str,
    ) -> Result<Vec<StepInvocation>, StepError> {
        let mut ctx = self.context(driver);
        ctx.dispatch(phrase)?;
        Ok(ctx.into_journal())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, reason = "tests fail fast on unexpected outcomes")]

    use super::*;
    use crate::driver::RecordingDriver;
    use anyhow::{Result, ensure};
    use rstest::{fixture, rstest};
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<String>>>;

    fn record_into(
        seen: &Seen,
        label: &'static str,
    ) -> impl Fn(&mut StepContext<'_>, &StepArgs) -> Result<(), StepError> + Send + Sync + 'static {
        let sink = Arc::clone(seen);
        move |_ctx, args| {
            let rendered = args.journal_values().join("|");
            if let Ok(mut guard) = sink.lock() {
                guard.push(format!("{label}:{rendered}"));
            }
            Ok(())
        }
    }

    fn seen_values(seen: &Seen) -> Vec<String> {
        seen.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    #[fixture]
    fn seen() -> Seen {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[rstest]
    fn dispatch_invokes_matching_handler_with_captures(seen: Seen) -> Result<()> {
        let mut registry = StepRegistry::new();
        registry.register("navigate", "^I navigate back", record_into(&seen, "navigate"))?;
        registry.register(
            "select",
            r#"^I search product by fnm "(.*?)" and select this item with quantity "(.*?)""#,
            record_into(&seen, "select"),
        )?;
        let dispatcher = Dispatcher::new(registry, SuiteConfig::default());
        let mut driver = RecordingDriver::new();

        let journal = dispatcher.dispatch(
            &mut driver,
            r#"When I search product by fnm "08S01ZY" and select this item with quantity "2008""#,
        )?;

        ensure!(seen_values(&seen) == vec!["select:08S01ZY|2008"], "handler calls");
        ensure!(
            journal
                == vec![StepInvocation {
                    name: "select".into(),
                    args: vec!["08S01ZY".into(), "2008".into()],
                    depth: 0,
                }],
            "unexpected journal {journal:?}"
        );
        Ok(())
    }

    #[test]
    fn duplicate_patterns_are_rejected() -> Result<()> {
        let mut registry = StepRegistry::new();
        registry.register("first", "^I clean search bar", |_, _| Ok(()))?;
        let err = registry
            .register("second", "^I clean search bar", |_, _| Ok(()))
            .expect_err("duplicate should fail");
        ensure!(
            matches!(
                err,
                StepError::DuplicatePattern { ref pattern } if pattern == "^I clean search bar"
            ),
            "unexpected error {err:?}"
        );
        ensure!(registry.len() == 1, "duplicate must not replace the original");
        Ok(())
    }

    #[test]
    fn invalid_patterns_do_not_reserve_their_slot() -> Result<()> {
        let mut registry = StepRegistry::new();
        let err = registry
            .register("broken", "^I (search", |_, _| Ok(()))
            .expect_err("pattern should not compile");
        ensure!(
            matches!(err, StepError::InvalidPattern { .. }),
            "unexpected {err:?}"
        );
        ensure!(registry.is_empty(), "failed registration must not be stored");
        Ok(())
    }

    #[rstest]
    #[case("I fly to the moon")]
    #[case("When")]
    #[case("   ")]
    fn unmatched_phrases_fail_with_no_match(#[case] phrase: &str) {
        let dispatcher = Dispatcher::new(StepRegistry::new(), SuiteConfig::default());
        let mut driver = RecordingDriver::new();
        let err = dispatcher
            .dispatch(&mut driver, phrase)
            .expect_err("nothing is registered");
        assert!(matches!(err, StepError::NoMatch { .. }), "unexpected {err:?}");
    }

    #[rstest]
    fn first_registration_wins_on_overlap(seen: Seen) -> Result<()> {
        let mut registry = StepRegistry::new();
        registry.register("broad", r#"^I search "(.*?)""#, record_into(&seen, "broad"))?;
        registry.register("narrow", r#"^I search "(.*?)"$"#, record_into(&seen, "narrow"))?;
        let dispatcher = Dispatcher::new(registry, SuiteConfig::default());
        dispatcher.dispatch(&mut RecordingDriver::new(), r#"I search "Aspirin""#)?;
        ensure!(
            seen_values(&seen) == vec!["broad:Aspirin"],
            "{:?}",
            seen_values(&seen)
        );
        Ok(())
    }

    #[rstest]
    fn handlers_compose_by_phrase_in_order(seen: Seen) -> Result<()> {
        let mut registry = StepRegistry::new();
        registry.register("leaf", r#"^leaf "(.*?)"$"#, record_into(&seen, "leaf"))?;
        registry.register("outer", "^outer$", |ctx, _| {
            ctx.dispatch_block(
                r#"
                    When leaf "a"

                    And leaf "b"
                "#,
            )
        })?;
        let dispatcher = Dispatcher::new(registry, SuiteConfig::default());
        let journal = dispatcher.dispatch(&mut RecordingDriver::new(), "Given outer")?;

        ensure!(seen_values(&seen) == vec!["leaf:a", "leaf:b"], "leaf order");
        let shape: Vec<(&str, usize)> = journal
            .iter()
            .map(|step| (step.name.as_str(), step.depth))
            .collect();
        ensure!(
            shape == vec![("outer", 0), ("leaf", 1), ("leaf", 1)],
            "unexpected journal shape {shape:?}"
        );
        Ok(())
    }

    #[rstest]
    fn block_dispatch_stops_at_first_failure(seen: Seen) -> Result<()> {
        let mut registry = StepRegistry::new();
        registry.register("leaf", r#"^leaf "(.*?)"$"#, record_into(&seen, "leaf"))?;
        registry.register("outer", "^outer$", |ctx, _| {
            ctx.dispatch_block("leaf \"a\"\nunknown step\nleaf \"b\"")
        })?;
        let dispatcher = Dispatcher::new(registry, SuiteConfig::default());
        let err = dispatcher
            .dispatch(&mut RecordingDriver::new(), "outer")
            .expect_err("unknown step should fail");
        ensure!(
            matches!(err, StepError::NoMatch { ref phrase } if phrase == "unknown step"),
            "unexpected {err:?}"
        );
        ensure!(seen_values(&seen) == vec!["leaf:a"], "later lines must not run");
        Ok(())
    }

    #[test]
    fn self_composition_is_bounded() -> Result<()> {
        let mut registry = StepRegistry::new();
        registry.register("loop", "^I loop forever$", |ctx, _| {
            ctx.dispatch("I loop forever")
        })?;
        let dispatcher = Dispatcher::new(registry, SuiteConfig::default());
        let err = dispatcher
            .dispatch(&mut RecordingDriver::new(), "I loop forever")
            .expect_err("recursion must be cut off");
        ensure!(
            matches!(
                err,
                StepError::CompositionTooDeep { depth, .. } if depth == MAX_COMPOSITION_DEPTH
            ),
            "unexpected {err:?}"
        );
        Ok(())
    }

    #[test]
    fn typed_composition_records_arguments() -> Result<()> {
        let registry = StepRegistry::new();
        let suite = SuiteConfig::default();
        let mut driver = RecordingDriver::new();
        let mut ctx = StepContext::new(&registry, &suite, &mut driver);
        ctx.compose("outer", &["x"], |outer| {
            outer.compose("inner", &["y", "z"], |inner| ensure_depth(inner.depth()))
        })?;
        let journal = ctx.into_journal();
        ensure!(
            journal.iter().map(|s| s.args.join(",")).collect::<Vec<_>>() == vec!["x", "y,z"],
            "unexpected journal {journal:?}"
        );
        Ok(())
    }

    fn ensure_depth(depth: usize) -> Result<(), StepError> {
        if depth == 2 {
            Ok(())
        } else {
            Err(StepError::assertion(depth.to_string(), "should be depth 2"))
        }
    }
}
