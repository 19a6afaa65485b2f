//! Relative imbalance report
//!
//! Plots the relative imbalance of every client under every allocation method, one
//! subplot per scenario, with reference lines at zero and at the scenario's average
//! relative imbalance.

use crate::analysis::constants::CLIENT_PLOT_ORDER;
use crate::common::data_structures::ImbalanceRecord;
use crate::common::grouping::{group_by_scenario, order_clients, ScenarioGroup};
use crate::common::plots::{
    Figure, LegendEntry, LegendSymbol, LineStyle, Marker, Panel, PlotError, ReferenceLine,
};
use crate::common::styles::{
    StyleResolver, AVERAGE_LINE_COLOR, RELATIVE_IMBALANCE_STYLES, ZERO_LINE_COLOR,
};
use crate::common::summary::{format_summary_table, imbalance_summary};
use crate::parsing::{parse_records, ParsingError};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Legend label of the dashed average line
pub const AVERAGE_LINE_LABEL: &str = "Average Relative Imbalance";

/// Errors that can occur while producing the relative imbalance report
#[derive(Error, Debug)]
pub enum RelativeImbalanceError {
    #[error("Failed to load relative imbalance data: {0}")]
    Parsing(#[from] ParsingError),

    #[error("Failed to plot relative imbalance: {0}")]
    Plot(#[from] PlotError),
}

type Result<T> = core::result::Result<T, RelativeImbalanceError>;

/// Relative imbalance rows grouped for plotting
pub struct RelativeImbalanceReport<'a> {
    groups: Vec<ScenarioGroup<'a, ImbalanceRecord>>,
    styles: StyleResolver,
}

impl<'a> RelativeImbalanceReport<'a> {
    pub fn new(records: &'a [ImbalanceRecord]) -> Self {
        let styles = StyleResolver::new(
            RELATIVE_IMBALANCE_STYLES,
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

    /// Builds the chart: one panel per scenario and the shared legend
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
            .chain(std::iter::once(LegendEntry {
                label: AVERAGE_LINE_LABEL.to_string(),
                color: AVERAGE_LINE_COLOR,
                symbol: LegendSymbol::DashedLine,
            }))
            .collect();

        Figure {
            panels,
            x_desc: "Client".to_string(),
            y_desc: "Relative Imbalance".to_string(),
            legend,
        }
    }

    fn panel(&self, group: &ScenarioGroup<'a, ImbalanceRecord>) -> Panel {
        let clients = order_clients(
            group.rows.iter().map(|row| row.client.as_str()),
            CLIENT_PLOT_ORDER,
        );
        for client in clients
            .iter()
            .filter(|client| !CLIENT_PLOT_ORDER.contains(*client))
        {
            debug!(scenario = group.scenario, client, "Client not in plot order, placing last");
        }

        // Constant within a scenario; only the first row is authoritative.
        let average = group
            .rows
            .first()
            .map(|row| row.average_relative_imbalance)
            .unwrap_or_default();
        if group
            .rows
            .iter()
            .any(|row| row.average_relative_imbalance != average)
        {
            warn!(
                scenario = group.scenario,
                average, "AverageRelativeImbalance differs between rows, using first value"
            );
        }

        let mut markers = Vec::with_capacity(group.rows.len());
        for allocation in group.allocations() {
            let color = self.styles.resolve(allocation).color;
            for row in group.rows_for(allocation) {
                if !row.value.is_finite() {
                    debug!(
                        scenario = group.scenario,
                        client = row.client.as_str(),
                        allocation,
                        "Skipping non-finite value"
                    );
                    continue;
                }
                if let Some(category) = clients.iter().position(|client| *client == row.client) {
                    markers.push(Marker {
                        category,
                        value: row.value,
                        color,
                    });
                }
            }
        }

        let mut reference_lines = vec![ReferenceLine {
            value: 0.0,
            color: ZERO_LINE_COLOR,
            width: 3,
            style: LineStyle::Solid,
        }];
        if average.is_finite() {
            reference_lines.push(ReferenceLine {
                value: average,
                color: AVERAGE_LINE_COLOR,
                width: 2,
                style: LineStyle::Dashed,
            });
        }

        Panel {
            title: group.scenario.to_string(),
            categories: clients.iter().map(|client| client.to_string()).collect(),
            reference_lines,
            markers,
        }
    }

    /// Formats the per scenario statistics as a table
    pub fn summary_table(&self) -> String {
        let rows = imbalance_summary(&self.groups, &self.styles);
        format_summary_table(&rows, Some("Relative Imbalance Summary"))
    }
}

/// Generate the relative imbalance chart
///
/// Loads `input_file`, renders one subplot per scenario and writes the SVG document to
/// `output_file`.
///
/// # Arguments
/// * `input_file` - CSV with columns Scenario, Client, Allocation, Value, AverageRelativeImbalance
/// * `output_file` - Where the SVG file should be saved
/// * `print_summary` - Whether to print the summary table to the console
///
/// # Returns
/// * `Ok(())` - If the chart was written
/// * `Err(RelativeImbalanceError)` - If loading or plotting failed
pub fn plot_relative_imbalance(
    input_file: &Path,
    output_file: &Path,
    print_summary: bool,
) -> Result<()> {
    let records: Vec<ImbalanceRecord> = parse_records(input_file)?;
    let report = RelativeImbalanceReport::new(&records);
    let figure = report.figure();

    figure.save_svg(output_file)?;
    info!(
        scenarios = figure.panels.len(),
        output = %output_file.display(),
        "Relative imbalance plot written"
    );

    if print_summary {
        println!("{}\n", report.summary_table());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::styles::{FALLBACK_COLORS, GREEN, RED};
    use std::fs;

    fn record(
        scenario: &str,
        client: &str,
        allocation: &str,
        value: f64,
        average: f64,
    ) -> ImbalanceRecord {
        ImbalanceRecord {
            scenario: scenario.to_string(),
            client: client.to_string(),
            allocation: allocation.to_string(),
            value,
            average_relative_imbalance: average,
        }
    }

    fn four_scenarios() -> Vec<ImbalanceRecord> {
        ["S1", "S2", "S3", "S4"]
            .iter()
            .flat_map(|scenario| {
                vec![
                    record(scenario, "G", "shapley", 0.1, 0.02),
                    record(scenario, "A", "shapley", -0.1, 0.02),
                    record(scenario, "A", "nucleolus", 0.05, 0.02),
                ]
            })
            .collect()
    }

    #[test]
    fn test_one_panel_per_scenario_in_order() {
        let records = four_scenarios();
        let figure = RelativeImbalanceReport::new(&records).figure();

        let titles: Vec<&str> = figure.panels.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["S1", "S2", "S3", "S4"]);
        assert_eq!(figure.x_desc, "Client");
        assert_eq!(figure.y_desc, "Relative Imbalance");
    }

    #[test]
    fn test_clients_follow_plot_order_and_skip_absent() {
        let records = vec![
            record("Peak", "W", "shapley", 0.3, 0.0),
            record("Peak", "K", "shapley", 0.2, 0.0),
            record("Peak", "A", "shapley", 0.1, 0.0),
            record("Peak", "Extra", "shapley", 0.4, 0.0),
        ];
        let figure = RelativeImbalanceReport::new(&records).figure();

        assert_eq!(figure.panels[0].categories, vec!["A", "K", "W", "Extra"]);
        assert_eq!(figure.panels[0].values_in("K"), vec![0.2]);
        assert_eq!(figure.panels[0].values_in("Extra"), vec![0.4]);
    }

    #[test]
    fn test_reference_lines_use_first_average() {
        let records = vec![
            record("Peak", "A", "shapley", 0.1, 0.05),
            record("Peak", "G", "VCG", 0.2, 0.05),
            record("Offpeak", "A", "shapley", 0.1, -0.01),
        ];
        let figure = RelativeImbalanceReport::new(&records).figure();

        let peak = &figure.panels[0];
        assert_eq!(peak.reference_lines.len(), 2);
        assert_eq!(peak.reference_lines[0].value, 0.0);
        assert_eq!(peak.reference_lines[0].style, LineStyle::Solid);
        assert_eq!(peak.reference_lines[1].value, 0.05);
        assert_eq!(peak.reference_lines[1].style, LineStyle::Dashed);
        assert_eq!(peak.reference_lines[1].color, AVERAGE_LINE_COLOR);

        assert_eq!(figure.panels[1].reference_lines[1].value, -0.01);
    }

    #[test]
    fn test_nan_value_adds_no_marker() {
        let records = vec![
            record("Peak", "A", "shapley", 0.1, 0.05),
            record("Peak", "G", "shapley", f64::NAN, 0.05),
        ];
        let with_nan = RelativeImbalanceReport::new(&records).figure();
        let without_nan = RelativeImbalanceReport::new(&records[..1]).figure();

        assert_eq!(with_nan.panels[0].markers.len(), 1);
        assert_eq!(with_nan.panels[0].values_in("A"), vec![0.1]);
        assert!(with_nan.panels[0].values_in("G").is_empty());

        // Only legend markers and the finite point are drawn.
        let svg = with_nan.render_svg().unwrap();
        let baseline = without_nan.render_svg().unwrap();
        assert_eq!(svg.matches("<circle").count(), baseline.matches("<circle").count());
    }

    #[test]
    fn test_nan_average_draws_no_average_line() {
        let records = vec![record("Peak", "A", "shapley", 0.1, f64::NAN)];
        let figure = RelativeImbalanceReport::new(&records).figure();

        let lines = &figure.panels[0].reference_lines;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].style, LineStyle::Solid);
    }

    #[test]
    fn test_marker_colors_and_fallback() {
        let records = vec![
            record("Peak", "A", "shapley", 0.1, 0.0),
            record("Peak", "A", "nucleolus", 0.2, 0.0),
            record("Peak", "A", "reduced_cost", 0.3, 0.0),
        ];
        let figure = RelativeImbalanceReport::new(&records).figure();
        let colors: Vec<_> = figure.panels[0].markers.iter().map(|m| m.color).collect();

        assert_eq!(colors, vec![RED, GREEN, FALLBACK_COLORS[0]]);
    }

    #[test]
    fn test_legend_entries() {
        let records = vec![record("Peak", "A", "reduced_cost", 0.3, 0.0)];
        let figure = RelativeImbalanceReport::new(&records).figure();
        let labels: Vec<&str> = figure.legend.iter().map(|e| e.label.as_str()).collect();

        assert_eq!(
            labels,
            vec![
                "Shapley",
                "VCG",
                "VCG Budget Balanced",
                "Gately Daily",
                "Gately 15Min interval",
                "Full Cost",
                "Nucleolus",
                "reduced_cost",
                AVERAGE_LINE_LABEL,
            ]
        );
        assert_eq!(
            figure.legend.last().map(|e| e.symbol),
            Some(LegendSymbol::DashedLine)
        );
    }

    #[test]
    fn test_five_scenarios_extend_grid() {
        let records: Vec<ImbalanceRecord> = (1..=5)
            .map(|i| record(&format!("S{i}"), "A", "shapley", 0.1, 0.0))
            .collect();
        let figure = RelativeImbalanceReport::new(&records).figure();

        assert_eq!(figure.panels.len(), 5);
        let svg = figure.render_svg().unwrap();
        assert!(svg.contains("S5"));
    }

    #[test]
    fn test_plot_relative_imbalance_writes_deterministic_svg() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("relative_imbalance_data.csv");
        fs::write(
            &input,
            "Scenario,Client,Allocation,Value,AverageRelativeImbalance\n\
             Peak,G,shapley,0.1,0.05\n\
             Peak,A,VCG,-0.2,0.05\n\
             Offpeak,A,shapley,0.3,0.01\n",
        )
        .unwrap();

        let first = temp_dir.path().join("first.svg");
        let second = temp_dir.path().join("second.svg");
        plot_relative_imbalance(&input, &first, false).unwrap();
        plot_relative_imbalance(&input, &second, false).unwrap();

        let first = fs::read_to_string(first).unwrap();
        let second = fs::read_to_string(second).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("Peak"));
        assert!(first.contains("Offpeak"));
        assert!(first.contains(AVERAGE_LINE_LABEL));
    }

    #[test]
    fn test_plot_relative_imbalance_missing_input() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output = temp_dir.path().join("out.svg");

        let result = plot_relative_imbalance(&temp_dir.path().join("missing.csv"), &output, false);

        assert!(matches!(
            result,
            Err(RelativeImbalanceError::Parsing(ParsingError::FileRead(_)))
        ));
        assert!(!output.exists());
    }
}
