//! Reporting utilities: formatted terminal output for `fo show`.

pub mod format;

pub use format::*;
