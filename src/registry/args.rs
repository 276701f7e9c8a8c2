//! Arguments captured from a matched phrase.

use crate::error::StepError;
use std::fmt::Display;
use std::str::FromStr;

/// Captured values bound to a step invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepArgs {
    step: String,
    values: Vec<Option<String>>,
    named: Vec<(String, usize)>,
}

impl StepArgs {
    pub(crate) fn new(
        step: impl Into<String>,
        values: Vec<Option<String>>,
        named: Vec<(String, usize)>,
    ) -> Self {
        Self {
            step: step.into(),
            values,
            named,
        }
    }

    /// Number of capture slots, including groups that did not participate.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the pattern captured nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the capture at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::MissingArgument`] when the slot does not exist or
    /// its group did not participate in the match.
    pub fn text(&self, index: usize) -> Result<&str, StepError> {
        self.values
            .get(index)
            .and_then(Option::as_deref)
            .ok_or_else(|| StepError::MissingArgument {
                step: self.step.clone(),
                index,
            })
    }

    /// Borrow the capture of the named group `name`, if it participated.
    #[must_use]
    pub fn named(&self, name: &str) -> Option<&str> {
        let (_, index) = self.named.iter().find(|(group, _)| group == name)?;
        self.values.get(*index).and_then(Option::as_deref)
    }

    /// Parse the capture at `index` into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::MissingArgument`] when the capture is absent and
    /// [`StepError::InvalidArgument`] when it does not parse.
    pub fn parse<T>(&self, index: usize) -> Result<T, StepError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.text(index)?;
        raw.parse().map_err(|err: T::Err| StepError::InvalidArgument {
            step: self.step.clone(),
            index,
            value: raw.to_owned(),
            reason: err.to_string(),
        })
    }

    /// Captured values rendered for the invocation journal.
    pub(crate) fn journal_values(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|value| value.clone().unwrap_or_default())
            .collect()
    }
}
