//! The acceptance suite's step catalogue.
//!
//! Each submodule registers its phrases with a [`StepRegistry`] and exposes
//! the same steps as typed functions so steps can compose without building
//! phrases.

pub mod drugs;
pub mod inventory;
pub mod navigation;
pub mod search;

use crate::error::StepError;
use crate::registry::StepRegistry;

/// Register every catalogue step with `registry`.
///
/// # Errors
///
/// Returns [`StepError::DuplicatePattern`] if `registry` already holds one of
/// the catalogue patterns.
pub fn register(registry: &mut StepRegistry) -> Result<(), StepError> {
    navigation::register(registry)?;
    search::register(registry)?;
    inventory::register(registry)?;
    drugs::register(registry)?;
    Ok(())
}

/// Build a registry holding the whole catalogue.
///
/// # Errors
///
/// Returns an error if a catalogue pattern fails to register.
pub fn catalog() -> Result<StepRegistry, StepError> {
    let mut registry = StepRegistry::new();
    register(&mut registry)?;
    Ok(registry)
}
