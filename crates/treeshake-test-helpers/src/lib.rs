//! Test utilities and fixtures for treeshake
//!
//! This crate provides a fixture parser for the JavaScript subset the
//! tree-shaker models, plus helpers shared by unit tests (#[cfg(test)]) and
//! integration tests (tests/ directory).

pub mod fixtures;
pub mod parse;
pub mod shake;

pub use parse::{parse_module, ParseError};
pub use shake::{bind_modules, shake, shake_modules, shake_with, FixtureError, ShakeOutput};
