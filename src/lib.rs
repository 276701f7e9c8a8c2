//! Acceptance-test steps for the LMIS Android stock app.
//!
//! This library provides a regex-keyed step registry with synchronous
//! composition, the stock app's step catalogue, environment profiles, and a
//! scenario runner that drives the steps through the [`driver::UiDriver`]
//! capability.

pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod registry;
pub mod runner;
pub mod scenario;
pub mod steps;
