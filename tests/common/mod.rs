//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod helpers;

#[allow(unused_imports)]
pub use helpers::{dir_is_empty, fast_limits, sample_formats, TestWorkflow};
