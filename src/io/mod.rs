//! Input/output helpers.
//!
//! - CSV ingest + schema normalization (`ingest`)
//! - merged-row CSV export (`export`)
//! - merged-series JSON read/write (`series`)

pub mod export;
pub mod ingest;
pub mod series;

pub use export::*;
pub use ingest::*;
pub use series::*;
