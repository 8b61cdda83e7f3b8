//! Test helpers for seedbed tests.
//!
//! This module provides utility functions for loading schema files
//! and common test operations.

#[path = "helpers/test_data.rs"]
pub mod test_data;
