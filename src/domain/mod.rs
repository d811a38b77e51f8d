//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the dashboard view catalog (`View`, `ForecastSource`, `ViewPlan`)
//! - normalized time-series rows (`ActualRow`, `ForecastRow`, `MergedRow`)
//! - the outer-join merge and its stats (`merge`)

pub mod merge;
pub mod types;

pub use merge::*;
pub use types::*;
