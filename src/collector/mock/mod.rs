//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built host scenarios for testing
//! readers without requiring a real `/sys` or `/proc` tree.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
