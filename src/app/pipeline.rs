//! Shared "view pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! resolve view -> read CSV pair -> outer-join on month -> stats
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::domain::{compute_stats, outer_join, MergeStats, MergedRow, SeriesPair, ViewPlan};
use crate::error::AppError;
use crate::io::ingest::load_series_pair;

/// All computed outputs of a single view load.
#[derive(Debug, Clone)]
pub struct ViewOutput {
    pub plan: ViewPlan,
    pub pair: SeriesPair,
    pub merged: Vec<MergedRow>,
    pub stats: MergeStats,
}

/// Execute the load/merge pipeline for a resolved view.
pub fn run_view(plan: &ViewPlan) -> Result<ViewOutput, AppError> {
    let pair = load_series_pair(plan)?;
    let merged = outer_join(&pair.actual, &pair.forecast);
    let stats = compute_stats(&merged);

    Ok(ViewOutput {
        plan: plan.clone(),
        pair,
        merged,
        stats,
    })
}
