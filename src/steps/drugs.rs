//! New-drug steps, including their stress-test variants.
//!
//! The stress switch is read from the suite configuration each time a step
//! runs.

use super::inventory::{initialize_products, should_see_total};
use super::search::{search_drug_by_fnm, search_product_by_fnm, select_unchecked_with_quantity};
use crate::error::StepError;
use crate::registry::{StepContext, StepRegistry};

/// `I have added new drugs`
pub const HAVE_ADDED_NEW_DRUGS: &str = "have_added_new_drugs";
/// `I check new drug quantity`
pub const CHECK_NEW_DRUG_QUANTITY: &str = "check_new_drug_quantity";
/// `I select new drug "<fnm>" with SOH "<soh>" quantity`
pub const SELECT_NEW_DRUG_WITH_SOH: &str = "select_new_drug_with_soh";

/// FNM code of the drug added by normal runs.
pub const NEW_DRUG_FNM: &str = "08S01ZY";
/// Quantity entered for [`NEW_DRUG_FNM`] by normal runs.
pub const NEW_DRUG_QUANTITY: &str = "2008";

pub(super) fn register(registry: &mut StepRegistry) -> Result<(), StepError> {
    registry.register(HAVE_ADDED_NEW_DRUGS, "^I have added new drugs", |ctx, _| {
        have_added_new_drugs_body(ctx)
    })?;
    registry.register(
        CHECK_NEW_DRUG_QUANTITY,
        "^I check new drug quantity",
        |ctx, _| check_new_drug_quantity_body(ctx),
    )?;
    registry.register(
        SELECT_NEW_DRUG_WITH_SOH,
        r#"^I select new drug "(.*?)" with SOH "(.*?)" quantity"#,
        |ctx, args| select_new_drug_with_soh_body(ctx, args.text(0)?, args.text(1)?),
    )?;
    Ok(())
}

/// Add the new drug, or bulk-initialise products in stress runs.
///
/// # Errors
///
/// Returns any error raised by a composed step.
pub fn have_added_new_drugs(ctx: &mut StepContext<'_>) -> Result<(), StepError> {
    ctx.compose(HAVE_ADDED_NEW_DRUGS, &[], have_added_new_drugs_body)
}

fn have_added_new_drugs_body(ctx: &mut StepContext<'_>) -> Result<(), StepError> {
    let suite = *ctx.suite();
    if suite.stress_test() {
        initialize_products(ctx, suite.stress_product_count())
    } else {
        search_product_by_fnm(ctx, NEW_DRUG_FNM, NEW_DRUG_QUANTITY)
    }
}

/// Check the new drug's quantity, or the stock-list total in stress runs.
///
/// # Errors
///
/// Returns any error raised by a composed step.
pub fn check_new_drug_quantity(ctx: &mut StepContext<'_>) -> Result<(), StepError> {
    ctx.compose(CHECK_NEW_DRUG_QUANTITY, &[], check_new_drug_quantity_body)
}

fn check_new_drug_quantity_body(ctx: &mut StepContext<'_>) -> Result<(), StepError> {
    let suite = *ctx.suite();
    if suite.stress_test() {
        should_see_total(ctx, suite.stress_product_count())
    } else {
        search_product_by_fnm(ctx, NEW_DRUG_FNM, NEW_DRUG_QUANTITY)
    }
}

/// Search for `fnm` and, if it is not ticked yet, select it with `soh`.
///
/// Unlike the search-and-select steps this leaves the search bar populated.
///
/// # Errors
///
/// Returns any error raised by the driver or a composed step.
pub fn select_new_drug_with_soh(
    ctx: &mut StepContext<'_>,
    fnm: &str,
    soh: &str,
) -> Result<(), StepError> {
    ctx.compose(SELECT_NEW_DRUG_WITH_SOH, &[fnm, soh], |ctx| {
        select_new_drug_with_soh_body(ctx, fnm, soh)
    })
}

fn select_new_drug_with_soh_body(
    ctx: &mut StepContext<'_>,
    fnm: &str,
    soh: &str,
) -> Result<(), StepError> {
    search_drug_by_fnm(ctx, fnm)?;
    select_unchecked_with_quantity(ctx, fnm, soh)
}
