//! Property-based tests
//!
//! Randomized checks of the vote ledger and store invariants.

pub mod ledger_proptest;
pub mod store_proptest;
