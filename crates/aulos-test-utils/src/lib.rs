#![forbid(unsafe_code)]

//! Shared test utilities for the aulos workspace.

pub mod fixtures;

pub use fixtures::*;
