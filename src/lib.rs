//! `forecast-overlay` library crate.
//!
//! The binary (`fo`) is a thin wrapper around this library so that:
//!
//! - the load/merge/render pipeline is testable without spawning processes
//! - modules are reusable (e.g., future GUI front-end, scripting)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
pub mod views;
