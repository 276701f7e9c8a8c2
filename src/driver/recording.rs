//! Scripted driver that records every call instead of touching a device.

use super::{DriverError, ElementHandle, Selector, UiDriver};
use itertools::Itertools;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use tracing::debug;

/// One primitive issued against a [`RecordingDriver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum DriverCall {
    /// A query and the number of elements it returned.
    Query {
        /// Rendered selector.
        selector: String,
        /// Number of handles returned.
        matches: usize,
    },
    /// A tap on the listed elements.
    Touch {
        /// Elements tapped.
        elements: Vec<ElementHandle>,
    },
    /// Text typed into a field.
    EnterText {
        /// Rendered selector of the field.
        selector: String,
        /// Text entered.
        text: String,
    },
    /// Fields cleared.
    ClearText {
        /// Elements cleared.
        elements: Vec<ElementHandle>,
    },
    /// A visible-text check and its answer.
    HasText {
        /// Text looked for.
        text: String,
        /// Whether it was reported visible.
        visible: bool,
    },
    /// One downward scroll.
    ScrollDown,
}

impl fmt::Display for DriverCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query { selector, matches } => write!(f, "query {selector} -> {matches}"),
            Self::Touch { elements } => write!(f, "touch [{}]", elements.iter().join(", ")),
            Self::EnterText { selector, text } => write!(f, "enter '{text}' into {selector}"),
            Self::ClearText { elements } => write!(f, "clear [{}]", elements.iter().join(", ")),
            Self::HasText { text, visible } => write!(f, "has text '{text}' -> {visible}"),
            Self::ScrollDown => f.write_str("scroll down"),
        }
    }
}

/// A [`UiDriver`] that answers queries from a script.
///
/// Queries consume one-shot responses queued with [`RecordingDriver::respond`]
/// first, then fall back to persistent responses set with
/// [`RecordingDriver::present`], and otherwise match nothing.
///
/// # Examples
///
/// ```
/// use lmis_steps::driver::{RecordingDriver, UiDriver, selector};
///
/// let mut driver = RecordingDriver::new();
/// driver.respond(selector::search_bar(), 1);
/// let found = driver.query(&selector::search_bar()).expect("query");
/// assert_eq!(found.len(), 1);
/// assert!(driver.query(&selector::search_bar()).expect("query").is_empty());
/// ```
#[derive(Debug, Default)]
pub struct RecordingDriver {
    queued: HashMap<String, VecDeque<usize>>,
    persistent: HashMap<String, usize>,
    visible_text: HashSet<String>,
    calls: Vec<DriverCall>,
}

impl RecordingDriver {
    /// Create a driver whose queries match nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a one-shot response of `count` elements for `selector`.
    pub fn respond(&mut self, selector: impl fmt::Display, count: usize) {
        self.queued
            .entry(selector.to_string())
            .or_default()
            .push_back(count);
    }

    /// Answer every unscripted query for `selector` with `count` elements.
    pub fn present(&mut self, selector: impl fmt::Display, count: usize) {
        self.persistent.insert(selector.to_string(), count);
    }

    /// Report `text` as visible to [`UiDriver::has_text`].
    pub fn show_text(&mut self, text: impl Into<String>) {
        self.visible_text.insert(text.into());
    }

    /// Calls issued so far, in order.
    #[must_use]
    pub fn calls(&self) -> &[DriverCall] {
        &self.calls
    }

    fn matches_for(&mut self, key: &str) -> usize {
        self.queued
            .get_mut(key)
            .and_then(VecDeque::pop_front)
            .or_else(|| self.persistent.get(key).copied())
            .unwrap_or(0)
    }

    fn record(&mut self, call: DriverCall) {
        debug!(%call, "driver call");
        self.calls.push(call);
    }
}

impl UiDriver for RecordingDriver {
    fn query(&mut self, selector: &Selector) -> Result<Vec<ElementHandle>, DriverError> {
        let key = selector.to_string();
        let matches = self.matches_for(&key);
        let handles = (0..matches)
            .map(|index| ElementHandle::new(format!("{key}[{index}]")))
            .collect();
        self.record(DriverCall::Query {
            selector: key,
            matches,
        });
        Ok(handles)
    }

    fn touch(&mut self, elements: &[ElementHandle]) -> Result<(), DriverError> {
        self.record(DriverCall::Touch {
            elements: elements.to_vec(),
        });
        Ok(())
    }

    fn enter_text(&mut self, selector: &Selector, text: &str) -> Result<(), DriverError> {
        self.record(DriverCall::EnterText {
            selector: selector.to_string(),
            text: text.to_owned(),
        });
        Ok(())
    }

    fn clear_text(&mut self, elements: &[ElementHandle]) -> Result<(), DriverError> {
        self.record(DriverCall::ClearText {
            elements: elements.to_vec(),
        });
        Ok(())
    }

    fn has_text(&mut self, text: &str) -> Result<bool, DriverError> {
        let visible = self.visible_text.contains(text);
        self.record(DriverCall::HasText {
            text: text.to_owned(),
            visible,
        });
        Ok(visible)
    }

    fn scroll_down(&mut self) -> Result<(), DriverError> {
        self.record(DriverCall::ScrollDown);
        Ok(())
    }
}
