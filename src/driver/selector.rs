//! Element selectors in the driver's query syntax.
//!
//! A selector names an element class (or `*` for any class) followed by
//! `key:'value'` predicates, for example
//! `android.widget.CheckBox id:'checkbox' checked:'false'`.

use serde::Serialize;
use std::fmt;

/// Matches any element class.
pub const ANY_CLASS: &str = "*";

/// One element query understood by the UI driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Selector {
    class: String,
    predicates: Vec<(String, String)>,
}

impl Selector {
    /// Select elements of `class` with no predicates.
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            predicates: Vec::new(),
        }
    }

    /// Select elements of any class.
    #[must_use]
    pub fn any() -> Self {
        Self::new(ANY_CLASS)
    }

    /// Add a `key:'value'` predicate.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.predicates.push((key.into(), value.into()));
        self
    }

    /// Restrict the selector to elements with the given identifier.
    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.with("id", id)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class)?;
        for (key, value) in &self.predicates {
            // Quotes inside values would terminate the literal early.
            write!(f, " {key}:'{}'", value.replace('\'', "\\'"))?;
        }
        Ok(())
    }
}

/// The toolbar search field on product lists.
#[must_use]
pub fn search_bar() -> Selector {
    Selector::new("android.support.v7.widget.SearchView").id("action_search")
}

/// Product checkboxes that have not been ticked yet.
#[must_use]
pub fn unchecked_product_checkbox() -> Selector {
    Selector::new("android.widget.CheckBox")
        .id("checkbox")
        .with("checked", "false")
}

/// Product name labels in a filtered list.
#[must_use]
pub fn product_name() -> Selector {
    Selector::new("android.widget.TextView").id("product_name")
}

/// The product list container.
#[must_use]
pub fn products_list() -> Selector {
    Selector::new("android.widget.RecyclerView").id("products_list")
}

/// Quantity input on the inventory page.
#[must_use]
pub fn inventory_quantity() -> Selector {
    Selector::new("android.widget.EditText").id("tx_quantity")
}

/// Any element displaying exactly `text`.
#[must_use]
pub fn with_text(text: &str) -> Selector {
    Selector::any().with("text", text)
}

/// The toolbar "navigate up" affordance.
#[must_use]
pub fn navigate_up() -> Selector {
    Selector::any().with("contentDescription", "Navigate up")
}
