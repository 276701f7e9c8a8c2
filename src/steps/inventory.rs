//! Inventory page steps: naming the selected item, entering quantities, bulk
//! initialisation, and the stock-list total.

use crate::driver::selector;
use crate::error::StepError;
use crate::registry::{StepContext, StepRegistry};
use std::slice;
use tracing::{debug, info};

/// `I select the item called "<name>"`
pub const SELECT_ITEM_CALLED: &str = "select_item_called";
/// `I enter quantity "<q>" on inventory page`
pub const ENTER_QUANTITY: &str = "enter_quantity";
/// `I initialize "<n>" products`
pub const INITIALIZE_PRODUCTS: &str = "initialize_products";
/// `I should see total:"<n>" on stock list page`
pub const SHOULD_SEE_TOTAL: &str = "should_see_total";

/// Quantity entered for every product during bulk initialisation.
pub const BULK_QUANTITY: &str = "1";
/// Consecutive scrolls without an unticked product before bulk
/// initialisation gives up.
pub const MAX_IDLE_SCROLLS: usize = 3;

pub(super) fn register(registry: &mut StepRegistry) -> Result<(), StepError> {
    registry.register(
        SELECT_ITEM_CALLED,
        r#"^I select the item called "(.*?)"$"#,
        |ctx, args| select_item_called_body(ctx, args.text(0)?),
    )?;
    registry.register(
        ENTER_QUANTITY,
        r#"^I enter quantity "(.*?)" on inventory page$"#,
        |ctx, args| enter_quantity_body(ctx, args.text(0)?),
    )?;
    registry.register(
        INITIALIZE_PRODUCTS,
        r#"^I initialize "(\d+)" products$"#,
        |ctx, args| initialize_products_body(ctx, args.parse(0)?),
    )?;
    registry.register(
        SHOULD_SEE_TOTAL,
        r#"^I should see total:"(\d+)" on stock list page$"#,
        |ctx, args| should_see_total_body(ctx, args.parse(0)?),
    )?;
    Ok(())
}

/// Tap the list entry labelled `name`.
///
/// # Errors
///
/// Returns [`crate::driver::DriverError::ElementNotFound`] when no such
/// entry is shown.
pub fn select_item_called(ctx: &mut StepContext<'_>, name: &str) -> Result<(), StepError> {
    ctx.compose(SELECT_ITEM_CALLED, &[name], |ctx| {
        select_item_called_body(ctx, name)
    })
}

fn select_item_called_body(ctx: &mut StepContext<'_>, name: &str) -> Result<(), StepError> {
    ctx.driver()
        .tap_when_element_exists(&selector::with_text(name))?;
    Ok(())
}

/// Type `quantity` into the inventory quantity field.
///
/// # Errors
///
/// Returns any driver error.
pub fn enter_quantity(ctx: &mut StepContext<'_>, quantity: &str) -> Result<(), StepError> {
    ctx.compose(ENTER_QUANTITY, &[quantity], |ctx| {
        enter_quantity_body(ctx, quantity)
    })
}

fn enter_quantity_body(ctx: &mut StepContext<'_>, quantity: &str) -> Result<(), StepError> {
    ctx.driver()
        .enter_text(&selector::inventory_quantity(), quantity)?;
    Ok(())
}

/// Tick and fill `count` unticked products, scrolling for more as needed.
///
/// # Errors
///
/// Returns [`StepError::Assertion`] when [`MAX_IDLE_SCROLLS`] scrolls in a
/// row reveal no unticked product, or any driver error.
pub fn initialize_products(ctx: &mut StepContext<'_>, count: u32) -> Result<(), StepError> {
    ctx.compose(INITIALIZE_PRODUCTS, &[&count.to_string()], |ctx| {
        initialize_products_body(ctx, count)
    })
}

fn initialize_products_body(ctx: &mut StepContext<'_>, count: u32) -> Result<(), StepError> {
    let checkbox = selector::unchecked_product_checkbox();
    let mut initialised = 0_u32;
    let mut idle_scrolls = 0_usize;
    while initialised < count {
        let unchecked = ctx.driver().query(&checkbox)?;
        let Some(first) = unchecked.first() else {
            if idle_scrolls == MAX_IDLE_SCROLLS {
                return Err(StepError::assertion(
                    format!("{count} products"),
                    format!("could not be initialised; ran out after {initialised}"),
                ));
            }
            debug!(initialised, "no unticked product on screen; scrolling");
            ctx.driver().scroll_down()?;
            idle_scrolls += 1;
            continue;
        };
        ctx.driver().touch(slice::from_ref(first))?;
        enter_quantity(ctx, BULK_QUANTITY)?;
        initialised += 1;
        idle_scrolls = 0;
    }
    info!(count, "initialised products");
    Ok(())
}

/// Assert that the stock list shows a total of `count`.
///
/// # Errors
///
/// Returns [`StepError::Assertion`] when the total is not visible.
pub fn should_see_total(ctx: &mut StepContext<'_>, count: u32) -> Result<(), StepError> {
    ctx.compose(SHOULD_SEE_TOTAL, &[&count.to_string()], |ctx| {
        should_see_total_body(ctx, count)
    })
}

fn should_see_total_body(ctx: &mut StepContext<'_>, count: u32) -> Result<(), StepError> {
    let expected = format!("Total:{count}");
    if ctx.driver().has_text(&expected)? {
        Ok(())
    } else {
        Err(StepError::assertion(
            expected,
            "should be shown on the stock list page",
        ))
    }
}
