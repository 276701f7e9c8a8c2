//! CLI parsing helpers for clap value parsers.

/// Largest product count accepted for stress runs.
const MAX_STRESS_PRODUCTS: u32 = 10_000;

pub(super) fn parse_product_count(s: &str) -> Result<u32, String> {
    let value: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("{s} is not a valid number"))?;
    check_product_count(value)
}

/// Bound a stress product count to `1..=10000`.
pub(super) fn check_product_count(value: u32) -> Result<u32, String> {
    if (1..=MAX_STRESS_PRODUCTS).contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "stress product count must be between 1 and {MAX_STRESS_PRODUCTS}"
        ))
    }
}

/// Accept a rendered selector such as `android.widget.CheckBox id:'checkbox'`.
///
/// The element class must be present; predicates are passed through
/// verbatim.
pub(super) fn parse_selector(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    let Some(class) = trimmed.split_whitespace().next() else {
        return Err(String::from("selector must not be empty"));
    };
    if class.contains(':') {
        return Err(format!(
            "selector '{s}' must start with an element class or '*'"
        ));
    }
    Ok(trimmed.to_owned())
}
