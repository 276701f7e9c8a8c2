//! Compiled step patterns and phrase normalisation.

use super::args::StepArgs;
use crate::error::StepError;
use regex::Regex;

/// Gherkin keywords that may prefix a phrase.
const KEYWORDS: &[&str] = &["Given", "When", "Then", "And", "But", "*"];

/// A regular expression matched against step phrases.
///
/// Patterns follow Cucumber conventions: `^` anchors the phrase start, a
/// trailing `$` anchors its end, and each capture group becomes a step
/// argument.
#[derive(Debug, Clone)]
pub struct StepPattern {
    regex: Regex,
}

impl StepPattern {
    /// Compile `source` into a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidPattern`] when `source` is not a valid
    /// regular expression.
    pub fn new(source: &str) -> Result<Self, StepError> {
        let regex = Regex::new(source).map_err(|source_err| StepError::InvalidPattern {
            pattern: source.to_owned(),
            source: source_err,
        })?;
        Ok(Self { regex })
    }

    /// Source text the pattern was compiled from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Number of capture groups, excluding the implicit whole match.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.regex.captures_len().saturating_sub(1)
    }

    /// Match `phrase`, returning the captured arguments for `step`.
    #[must_use]
    pub fn captures(&self, step: &str, phrase: &str) -> Option<StepArgs> {
        let caps = self.regex.captures(phrase)?;
        let values = caps
            .iter()
            .skip(1)
            .map(|group| group.map(|m| m.as_str().to_owned()))
            .collect();
        let named = self
            .regex
            .capture_names()
            .enumerate()
            .filter_map(|(index, name)| name.map(|n| (n.to_owned(), index.saturating_sub(1))))
            .collect();
        Some(StepArgs::new(step, values, named))
    }
}

/// Strip a leading Gherkin keyword and surrounding whitespace.
///
/// # Examples
///
/// ```
/// use lmis_steps::registry::strip_keyword;
///
/// assert_eq!(strip_keyword("  When I navigate back "), "I navigate back");
/// assert_eq!(strip_keyword("Android app"), "Android app");
/// ```
#[must_use]
pub fn strip_keyword(phrase: &str) -> &str {
    let trimmed = phrase.trim();
    KEYWORDS
        .iter()
        .find_map(|keyword| {
            trimmed
                .strip_prefix(keyword)
                .filter(|rest| rest.starts_with(char::is_whitespace))
        })
        .map_or(trimmed, str::trim_start)
}
