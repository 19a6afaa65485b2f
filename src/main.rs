mod analysis;
mod common;
mod parsing;

use analysis::constants::{
    DEFAULT_RESULTS_DIR, EXCESS_INPUT, EXCESS_OUTPUT, RELATIVE_IMBALANCE_INPUT,
    RELATIVE_IMBALANCE_OUTPUT,
};
use analysis::{plot_excess, plot_relative_imbalance};
use argh::FromArgs;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Renders comparison charts of pre-computed cost allocation results
#[derive(FromArgs, Debug)]
struct Args {
    /// directory holding the input tables and receiving the charts (default: Results)
    #[argh(option, short = 'r', default = "PathBuf::from(DEFAULT_RESULTS_DIR)")]
    results_dir: PathBuf,

    /// report to render: relative-imbalance, excess or all (default: relative-imbalance)
    #[argh(option, short = 'p', default = "Report::RelativeImbalance")]
    report: Report,

    /// do not print summary tables
    #[argh(switch, short = 'q')]
    quiet: bool,
}

/// Which charts to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Report {
    RelativeImbalance,
    Excess,
    All,
}

impl Report {
    fn includes_relative_imbalance(self) -> bool {
        matches!(self, Report::RelativeImbalance | Report::All)
    }

    fn includes_excess(self) -> bool {
        matches!(self, Report::Excess | Report::All)
    }
}

impl FromStr for Report {
    type Err = String;

    fn from_str(value: &str) -> core::result::Result<Self, Self::Err> {
        match value {
            "relative-imbalance" => Ok(Report::RelativeImbalance),
            "excess" => Ok(Report::Excess),
            "all" => Ok(Report::All),
            other => Err(format!(
                "unknown report '{}', expected relative-imbalance, excess or all",
                other
            )),
        }
    }
}

/// Errors that can occur while rendering reports
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Relative imbalance report error: {0}")]
    RelativeImbalance(#[from] analysis::relative_imbalance::RelativeImbalanceError),

    #[error("Excess report error: {0}")]
    Excess(#[from] analysis::excess::ExcessError),
}

type Result<T> = core::result::Result<T, AnalysisError>;

/// Initialize logging, `RUST_LOG` overrides the default `info` filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let args: Args = argh::from_env();
    let print_summary = !args.quiet;

    info!(
        results_dir = %args.results_dir.display(),
        report = ?args.report,
        "Rendering allocation charts"
    );

    if args.report.includes_relative_imbalance() {
        plot_relative_imbalance(
            &args.results_dir.join(RELATIVE_IMBALANCE_INPUT),
            &args.results_dir.join(RELATIVE_IMBALANCE_OUTPUT),
            print_summary,
        )?;
    }

    if args.report.includes_excess() {
        plot_excess(
            &args.results_dir.join(EXCESS_INPUT),
            &args.results_dir.join(EXCESS_OUTPUT),
            print_summary,
        )?;
    }

    Ok(())
}
