//! File names, client ordering and figure geometry shared by the reports

/// Clients in plotting order, sorted by their demand
pub const CLIENT_PLOT_ORDER: &[&str] = &[
    "A", "G", "F", "I", "Q", "S", "K", "H", "U", "L", "Y", "T", "O", "J", "V", "N", "W",
];

/// Directory holding both the input tables and the rendered charts
pub const DEFAULT_RESULTS_DIR: &str = "Results";

pub const RELATIVE_IMBALANCE_INPUT: &str = "relative_imbalance_data.csv";
pub const RELATIVE_IMBALANCE_OUTPUT: &str = "relative_imbalance.svg";

pub const EXCESS_INPUT: &str = "excess_data.csv";
pub const EXCESS_OUTPUT: &str = "excess_plot.svg";

/// Width of a rendered figure in pixels
pub const FIGURE_WIDTH: u32 = 1400;

/// Height of one row of subplots in pixels
pub const ROW_HEIGHT: u32 = 400;

/// Height of the shared legend strip below the subplots
pub const LEGEND_HEIGHT: u32 = 60;

/// Maximum number of subplot columns
pub const MAX_COLUMNS: usize = 2;
