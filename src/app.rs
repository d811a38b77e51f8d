//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the selected view to a CSV pair
//! - loads and merges the series
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, PlotArgs, SampleArgs, ShowArgs};
use crate::domain::View;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `fo` binary.
pub fn run() -> Result<(), AppError> {
    // We want `fo` and `fo --source prophet` to behave like `fo tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Show(args) => handle_show(args),
        Command::Plot(args) => handle_plot(args),
        Command::Sample(args) => handle_sample(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    // The recommendations view is static text; there is nothing to load.
    if args.view.view == View::Recommendations {
        println!("{}", crate::views::RECOMMENDATIONS);
        return Ok(());
    }

    let plan = crate::views::resolve_view(
        args.view.view,
        args.view.source,
        args.view.segment.as_deref(),
        &args.view.data_dir,
    )?;
    let out = pipeline::run_view(&plan)?;

    println!("{}", crate::report::format_view_summary(&out.plan, &out.stats));

    if args.table {
        println!("{}", crate::report::format_merged_table(&out.merged, &plan.value_name));
    }

    if !args.no_plot {
        let plot =
            crate::plot::render_overlay_plot(&out.merged, &plan.value_name, args.width, args.height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::export::write_merged_csv(path, &plan.value_name, &out.merged)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::series::write_merged_json(path, &plan.title, &plan.value_name, plan.source, &out.merged)?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let merged = crate::io::series::read_merged_json(&args.merged)?;

    println!("{} ({})", merged.title, merged.source.display_name());
    let plot = crate::plot::render_overlay_from_file(&merged, args.width, args.height);
    println!("{plot}");

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let written = crate::data::write_demo_data(&args.out_dir, args.seed, args.months, args.horizon)?;

    println!("Wrote {} demo files under {}:", written.len(), args.out_dir.display());
    for path in &written {
        println!("  {}", path.display());
    }

    Ok(())
}

/// Rewrite argv so `fo` defaults to `fo tui`.
///
/// Rules:
/// - `fo`                        -> `fo tui`
/// - `fo --source prophet ...`   -> `fo tui --source prophet ...`
/// - `fo --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "plot" | "sample" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(args(&["fo"])), args(&["fo", "tui"]));
    }

    #[test]
    fn leading_flags_route_to_tui() {
        assert_eq!(
            rewrite_args(args(&["fo", "--source", "prophet"])),
            args(&["fo", "tui", "--source", "prophet"])
        );
        assert_eq!(
            rewrite_args(args(&["fo", "-d", "demo-data"])),
            args(&["fo", "tui", "-d", "demo-data"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(args(&["fo", "show", "--table"])),
            args(&["fo", "show", "--table"])
        );
        assert_eq!(rewrite_args(args(&["fo", "--help"])), args(&["fo", "--help"]));
        assert_eq!(rewrite_args(args(&["fo", "-V"])), args(&["fo", "-V"]));
        assert_eq!(rewrite_args(args(&["fo", "sample"])), args(&["fo", "sample"]));
    }
}
