//! Excess (max instability) report
//!
//! Plots the maximum instability of every allocation method, one subplot per scenario,
//! with the allocation methods on the x-axis.

use crate::common::data_structures::ExcessRecord;
use crate::common::grouping::{group_by_scenario, ScenarioGroup};
use crate::common::plots::{Figure, LegendEntry, LegendSymbol, Marker, Panel, PlotError};
use crate::common::styles::{StyleResolver, EXCESS_STYLES};
use crate::common::summary::{excess_summary, format_summary_table};
use crate::parsing::{parse_records, ParsingError};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while producing the excess report
#[derive(Error, Debug)]
pub enum ExcessError {
    #[error("Failed to load excess data: {0}")]
    Parsing(#[from] ParsingError),

    #[error("Failed to plot excess: {0}")]
    Plot(#[from] PlotError),
}

type Result<T> = core::result::Result<T, ExcessError>;

/// Excess rows grouped for plotting
pub struct ExcessReport<'a> {
    groups: Vec<ScenarioGroup<'a, ExcessRecord>>,
    styles: StyleResolver,
}

impl<'a> ExcessReport<'a> {
    pub fn new(records: &'a [ExcessRecord]) -> Self {
        let styles = StyleResolver::new(
            EXCESS_STYLES,
            records.iter().map(|record| record.allocation.as_str()),
        );
        for identifier in styles.unknown_identifiers() {
            debug!(allocation = %identifier, "No style configured, using fallback colour");
        }

        Self {
            groups: group_by_scenario(records),
            styles,
        }
    }

    pub fn figure(&self) -> Figure {
        let panels = self.groups.iter().map(|group| self.panel(group)).collect();
        let legend = self
            .styles
            .legend_styles()
            .into_iter()
            .map(|style| LegendEntry {
                label: style.label,
                color: style.color,
                symbol: LegendSymbol::Marker,
            })
            .collect();

        Figure {
            panels,
            x_desc: "Allocation".to_string(),
            y_desc: "Max Instability".to_string(),
            legend,
        }
    }

    fn panel(&self, group: &ScenarioGroup<'a, ExcessRecord>) -> Panel {
        let allocations = group.allocations();
        let mut categories = Vec::with_capacity(allocations.len());
        let mut markers = Vec::with_capacity(group.rows.len());

        for (category, allocation) in allocations.into_iter().enumerate() {
            let style = self.styles.resolve(allocation);
            markers.extend(
                group
                    .rows_for(allocation)
                    .filter(|row| row.max_instability.is_finite())
                    .map(|row| Marker {
                        category,
                        value: row.max_instability,
                        color: style.color,
                    }),
            );
            categories.push(style.label);
        }

        Panel {
            title: group.scenario.to_string(),
            categories,
            reference_lines: Vec::new(),
            markers,
        }
    }

    pub fn summary_table(&self) -> String {
        let rows = excess_summary(&self.groups, &self.styles);
        format_summary_table(&rows, Some("Max Instability Summary"))
    }
}

/// Generate the max instability chart
///
/// # Arguments
/// * `input_file` - CSV with columns Scenario, Allocation, MaxInstability
/// * `output_file` - Where the SVG file should be saved
/// * `print_summary` - Whether to print the summary table to the console
///
/// # Returns
/// * `Ok(())` - If the chart was written
/// * `Err(ExcessError)` - If loading or plotting failed
pub fn plot_excess(input_file: &Path, output_file: &Path, print_summary: bool) -> Result<()> {
    let records: Vec<ExcessRecord> = parse_records(input_file)?;
    let report = ExcessReport::new(&records);
    let figure = report.figure();

    figure.save_svg(output_file)?;
    info!(
        scenarios = figure.panels.len(),
        output = %output_file.display(),
        "Excess plot written"
    );

    if print_summary {
        println!("{}\n", report.summary_table());
    }

    Ok(())
}
