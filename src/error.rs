//! Error types raised while registering and executing steps, and while
//! parsing scenario scripts.
//!
//! Every failure is terminal for the running scenario: nothing in this crate
//! retries. Driver errors pass through [`StepError::Driver`] unmodified.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use crate::driver::DriverError;
use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

/// A business-level mismatch detected by an assertion step.
///
/// Displays as `<subject> <expectation>`. The Calabash step files this
/// catalogue replaces ran the two together with no space, as in
/// `08S01ZYshould not see in this page`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure {
    subject: String,
    expectation: String,
}

impl AssertionFailure {
    /// Describe a failed expectation about `subject`.
    #[must_use]
    pub fn new(subject: impl Into<String>, expectation: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            expectation: expectation.into(),
        }
    }

    /// The product, text, or element the assertion was about.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// What was expected of the subject.
    #[must_use]
    pub fn expectation(&self) -> &str {
        &self.expectation
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.subject, self.expectation)
    }
}

/// Errors raised by the step registry, the dispatcher, and step bodies.
#[derive(Debug, Error, Diagnostic)]
pub enum StepError {
    /// No registered pattern matches the phrase.
    #[error("no step matches phrase '{phrase}'")]
    #[diagnostic(
        code(lmis_steps::registry::no_match),
        help("run `lmis-steps steps` to list the registered patterns")
    )]
    NoMatch {
        /// The phrase as it was dispatched.
        phrase: String,
    },

    /// The identical pattern was registered twice.
    #[error("step pattern '{pattern}' is already registered")]
    #[diagnostic(code(lmis_steps::registry::duplicate_pattern))]
    DuplicatePattern {
        /// Source text of the conflicting pattern.
        pattern: String,
    },

    /// A pattern failed to compile as a regular expression.
    #[error("step pattern '{pattern}' is not a valid regular expression")]
    #[diagnostic(code(lmis_steps::registry::invalid_pattern))]
    InvalidPattern {
        /// Source text of the rejected pattern.
        pattern: String,
        /// Compilation error reported by the regex engine.
        source: regex::Error,
    },

    /// A handler asked for a capture its pattern did not produce.
    #[error("step '{step}' has no captured argument at position {index}")]
    #[diagnostic(code(lmis_steps::step::missing_argument))]
    MissingArgument {
        /// Name of the step being executed.
        step: String,
        /// Zero-based capture position.
        index: usize,
    },

    /// A captured argument could not be converted to the requested type.
    #[error("step '{step}' argument {index} ('{value}') is invalid: {reason}")]
    #[diagnostic(code(lmis_steps::step::invalid_argument))]
    InvalidArgument {
        /// Name of the step being executed.
        step: String,
        /// Zero-based capture position.
        index: usize,
        /// Raw captured text.
        value: String,
        /// Conversion failure description.
        reason: String,
    },

    /// An assertion step observed an unexpected screen state.
    #[error("assertion failed: {0}")]
    #[diagnostic(code(lmis_steps::step::assertion))]
    Assertion(AssertionFailure),

    /// Step composition nested beyond the supported depth.
    #[error("step composition exceeded depth {depth} while running '{phrase}'")]
    #[diagnostic(
        code(lmis_steps::step::composition_too_deep),
        help("a step is probably invoking itself, directly or through another step")
    )]
    CompositionTooDeep {
        /// Depth limit that was hit.
        depth: usize,
        /// Step name or phrase that would have exceeded the limit.
        phrase: String,
    },

    /// The UI driver reported a failure.
    #[error(transparent)]
    #[diagnostic(code(lmis_steps::driver))]
    Driver(#[from] DriverError),
}

/// Errors raised while parsing a scenario script.
#[derive(Debug, Error, Diagnostic)]
pub enum ScriptError {
    /// The script uses a Gherkin construct the runner does not support.
    #[error("line {line}: '{keyword}' is not supported")]
    #[diagnostic(
        code(lmis_steps::script::unsupported_keyword),
        help("write each scenario out with `Scenario:` and plain step lines")
    )]
    UnsupportedKeyword {
        /// Keyword as written, without its trailing colon.
        keyword: String,
        /// One-based line number.
        line: usize,
    },
}

impl StepError {
    /// Build an [`StepError::Assertion`] for `subject`.
    #[must_use]
    pub fn assertion(subject: impl Into<String>, expectation: impl Into<String>) -> Self {
        Self::Assertion(AssertionFailure::new(subject, expectation))
    }
}

impl From<AssertionFailure> for StepError {
    fn from(failure: AssertionFailure) -> Self {
        Self::Assertion(failure)
    }
}
