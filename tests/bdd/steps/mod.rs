//! Step definition modules for BDD scenarios.

mod dispatch;
