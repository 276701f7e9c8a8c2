//! Screen navigation steps.

use crate::driver::selector;
use crate::error::StepError;
use crate::registry::{StepContext, StepRegistry};

/// `I navigate back`
pub const NAVIGATE_BACK: &str = "navigate_back";
/// `I scroll down until I see the "<text>"`
pub const SCROLL_DOWN_UNTIL_SEE: &str = "scroll_down_until_see";

pub(super) fn register(registry: &mut StepRegistry) -> Result<(), StepError> {
    registry.register(NAVIGATE_BACK, "^I navigate back", |ctx, _| {
        navigate_back_body(ctx)
    })?;
    registry.register(
        SCROLL_DOWN_UNTIL_SEE,
        r#"^I scroll down until I see the "([^"]*)""#,
        |ctx, args| scroll_down_until_see_body(ctx, args.text(0)?),
    )?;
    Ok(())
}

/// Tap the toolbar's up arrow.
///
/// # Errors
///
/// Returns [`crate::driver::DriverError::ElementNotFound`] when the arrow is
/// not shown.
pub fn navigate_back(ctx: &mut StepContext<'_>) -> Result<(), StepError> {
    ctx.compose(NAVIGATE_BACK, &[], navigate_back_body)
}

fn navigate_back_body(ctx: &mut StepContext<'_>) -> Result<(), StepError> {
    ctx.driver().tap_when_element_exists(&selector::navigate_up())?;
    Ok(())
}

/// Scroll down once unless `text` is already visible.
///
/// # Errors
///
/// Returns any driver error.
pub fn scroll_down_until_see(ctx: &mut StepContext<'_>, text: &str) -> Result<(), StepError> {
    ctx.compose(SCROLL_DOWN_UNTIL_SEE, &[text], |ctx| {
        scroll_down_until_see_body(ctx, text)
    })
}

fn scroll_down_until_see_body(ctx: &mut StepContext<'_>, text: &str) -> Result<(), StepError> {
    // Single scroll; callers repeat the step when a page is not enough.
    if !ctx.driver().has_text(text)? {
        ctx.driver().scroll_down()?;
    }
    Ok(())
}
