//! Shared test helpers for `scratchforce-core` integration tests.
//!
//! These helpers provide scripted in-memory doubles for the core ports so
//! workflow tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod org;

pub use org::{environment_row, MockConnector, MockOrg, MockPackager};
