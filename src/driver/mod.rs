//! The UI-automation capability consumed by step definitions.
//!
//! The driver itself lives outside this crate. Steps only see the
//! [`UiDriver`] trait; [`RecordingDriver`] is a scripted stand-in used for dry
//! runs and tests.

mod recording;
pub mod selector;

pub use recording::{DriverCall, RecordingDriver};
pub use selector::Selector;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Opaque reference to an on-screen element returned by [`UiDriver::query`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ElementHandle(String);

impl ElementHandle {
    /// Wrap a driver-specific element reference.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Borrow the driver-specific reference.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failures reported by the UI driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// No element matched a selector that had to resolve.
    #[error("no element matches '{selector}'")]
    ElementNotFound {
        /// Rendered selector.
        selector: String,
    },
    /// The device or automation server failed.
    #[error("device error: {message}")]
    Device {
        /// Driver-supplied description.
        message: String,
    },
}

/// Touch, text-entry, and inspection primitives of a mobile UI driver.
///
/// Every call may block on the device; none is retried by the caller.
#[cfg_attr(test, mockall::automock)]
pub trait UiDriver {
    /// Return the elements matching `selector`, possibly none.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] when the device cannot be queried.
    fn query(&mut self, selector: &Selector) -> Result<Vec<ElementHandle>, DriverError>;

    /// Simulate a tap on each element.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] when the tap cannot be delivered.
    fn touch(&mut self, elements: &[ElementHandle]) -> Result<(), DriverError>;

    /// Type `text` into the field matched by `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] when the field is missing or rejects input.
    fn enter_text(&mut self, selector: &Selector, text: &str) -> Result<(), DriverError>;

    /// Clear the contents of each field.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] when a field cannot be cleared.
    fn clear_text(&mut self, elements: &[ElementHandle]) -> Result<(), DriverError>;

    /// Report whether `text` is visible on the current screen.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] when the screen cannot be inspected.
    fn has_text(&mut self, text: &str) -> Result<bool, DriverError>;

    /// Scroll the current screen down by one page.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] when the gesture fails.
    fn scroll_down(&mut self) -> Result<(), DriverError>;

    /// Tap the first element matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::ElementNotFound`] when nothing matches, or any
    /// error raised by [`UiDriver::query`] or [`UiDriver::touch`].
    fn tap_when_element_exists(&mut self, selector: &Selector) -> Result<(), DriverError> {
        let elements = self.query(selector)?;
        let Some(first) = elements.into_iter().next() else {
            return Err(DriverError::ElementNotFound {
                selector: selector.to_string(),
            });
        };
        self.touch(std::slice::from_ref(&first))
    }
}
