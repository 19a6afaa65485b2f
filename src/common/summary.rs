//! Console summary tables printed after a chart has been rendered
//!
//! Rows are built from the scenario groups of a report and formatted with the
//! [`tabled`] crate.

use crate::common::data_structures::{ExcessRecord, ImbalanceRecord};
use crate::common::grouping::ScenarioGroup;
use crate::common::styles::StyleResolver;
use itertools::{Itertools, MinMaxResult};
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Per scenario and allocation statistics of the relative imbalance table
#[derive(Debug, Clone, Tabled)]
pub struct ImbalanceSummaryRow {
    #[tabled(rename = "Scenario")]
    pub scenario: String,
    #[tabled(rename = "Allocation")]
    pub allocation: String,
    #[tabled(rename = "Clients")]
    pub clients: usize,
    #[tabled(rename = "Min")]
    pub min: String,
    #[tabled(rename = "Max")]
    pub max: String,
    #[tabled(rename = "Mean")]
    pub mean: String,
    /// The scenario's average relative imbalance
    #[tabled(rename = "Average")]
    pub average: String,
}

/// Max instability of one allocation in one scenario
#[derive(Debug, Clone, Tabled)]
pub struct ExcessSummaryRow {
    #[tabled(rename = "Scenario")]
    pub scenario: String,
    #[tabled(rename = "Allocation")]
    pub allocation: String,
    #[tabled(rename = "Max Instability")]
    pub max_instability: String,
}

fn format_value(value: f64) -> String {
    format!("{:.4}", value)
}

/// Builds one summary row per scenario and allocation, in plotting order
pub fn imbalance_summary(
    groups: &[ScenarioGroup<'_, ImbalanceRecord>],
    styles: &StyleResolver,
) -> Vec<ImbalanceSummaryRow> {
    let mut rows = Vec::new();

    for group in groups {
        let average = group
            .rows
            .first()
            .map(|row| row.average_relative_imbalance)
            .unwrap_or_default();

        for allocation in group.allocations() {
            let values: Vec<f64> = group
                .rows_for(allocation)
                .map(|row| row.value)
                .filter(|value| value.is_finite())
                .collect();
            let (min, max) = match values.iter().copied().minmax_by(f64::total_cmp) {
                MinMaxResult::NoElements => continue,
                MinMaxResult::OneElement(value) => (value, value),
                MinMaxResult::MinMax(min, max) => (min, max),
            };
            let mean = values.iter().sum::<f64>() / values.len() as f64;

            rows.push(ImbalanceSummaryRow {
                scenario: group.scenario.to_string(),
                allocation: styles.resolve(allocation).label,
                clients: values.len(),
                min: format_value(min),
                max: format_value(max),
                mean: format_value(mean),
                average: format_value(average),
            });
        }
    }

    rows
}

/// Builds one summary row per excess record, in plotting order
pub fn excess_summary(
    groups: &[ScenarioGroup<'_, ExcessRecord>],
    styles: &StyleResolver,
) -> Vec<ExcessSummaryRow> {
    groups
        .iter()
        .flat_map(|group| {
            group.allocations().into_iter().flat_map(move |allocation| {
                group.rows_for(allocation).map(move |row| ExcessSummaryRow {
                    scenario: group.scenario.to_string(),
                    allocation: styles.resolve(allocation).label,
                    max_instability: format_value(row.max_instability),
                })
            })
        })
        .collect()
}

/// Renders summary rows as a box-drawn console table, headed by the title and the
/// number of rows.
pub fn format_summary_table<T: Tabled>(rows: &[T], title: Option<&str>) -> String {
    let heading = title.map(|title| format!("{} (rows: {})", title, rows.len()));
    let body = if rows.is_empty() {
        "(no rows)".to_string()
    } else {
        Table::new(rows).with(Style::modern()).to_string()
    };

    match heading {
        Some(heading) => {
            let underline = "─".repeat(heading.chars().count());
            format!("{}\n{}\n{}", heading, underline, body)
        }
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::grouping::group_by_scenario;
    use crate::common::styles::{EXCESS_STYLES, RELATIVE_IMBALANCE_STYLES};

    fn imbalance(scenario: &str, client: &str, allocation: &str, value: f64) -> ImbalanceRecord {
        ImbalanceRecord {
            scenario: scenario.to_string(),
            client: client.to_string(),
            allocation: allocation.to_string(),
            value,
            average_relative_imbalance: 0.05,
        }
    }

    #[test]
    fn test_imbalance_summary() {
        let records = vec![
            imbalance("Peak", "A", "shapley", 0.1),
            imbalance("Peak", "G", "shapley", -0.3),
            imbalance("Peak", "A", "nucleolus", 0.2),
        ];
        let groups = group_by_scenario(&records);
        let styles = StyleResolver::new(
            RELATIVE_IMBALANCE_STYLES,
            records.iter().map(|r| r.allocation.as_str()),
        );

        let rows = imbalance_summary(&groups, &styles);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].allocation, "Shapley");
        assert_eq!(rows[0].clients, 2);
        assert_eq!(rows[0].min, "-0.3000");
        assert_eq!(rows[0].max, "0.1000");
        assert_eq!(rows[0].mean, "-0.1000");
        assert_eq!(rows[0].average, "0.0500");
        assert_eq!(rows[1].allocation, "Nucleolus");
        assert_eq!(rows[1].min, rows[1].max);
    }

    #[test]
    fn test_imbalance_summary_skips_non_finite_values() {
        let records = vec![
            imbalance("Peak", "A", "shapley", 0.1),
            imbalance("Peak", "G", "shapley", f64::NAN),
            imbalance("Peak", "A", "nucleolus", f64::INFINITY),
        ];
        let groups = group_by_scenario(&records);
        let styles = StyleResolver::new(
            RELATIVE_IMBALANCE_STYLES,
            records.iter().map(|r| r.allocation.as_str()),
        );

        let rows = imbalance_summary(&groups, &styles);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].clients, 1);
        assert_eq!(rows[0].mean, "0.1000");
    }

    #[test]
    fn test_excess_summary_uses_raw_identifier_for_unknown() {
        let records = vec![
            ExcessRecord {
                scenario: "Base".to_string(),
                allocation: "gately_full".to_string(),
                max_instability: 1.25,
            },
            ExcessRecord {
                scenario: "Base".to_string(),
                allocation: "egalitarian".to_string(),
                max_instability: 0.5,
            },
        ];
        let groups = group_by_scenario(&records);
        let styles = StyleResolver::new(EXCESS_STYLES, records.iter().map(|r| r.allocation.as_str()));

        let rows = excess_summary(&groups, &styles);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].allocation, "Gately Full");
        assert_eq!(rows[0].max_instability, "1.2500");
        assert_eq!(rows[1].allocation, "egalitarian");
    }

    #[test]
    fn test_format_summary_table() {
        let rows = vec![ExcessSummaryRow {
            scenario: "Base".to_string(),
            allocation: "Shapley".to_string(),
            max_instability: "0.1000".to_string(),
        }];

        let table = format_summary_table(&rows, Some("Excess"));
        let mut lines = table.lines();
        assert_eq!(lines.next(), Some("Excess (rows: 1)"));
        assert_eq!(lines.next(), Some("─".repeat(16).as_str()));
        assert!(lines.next().is_some_and(|line| line.starts_with('┌')));
        assert!(table.contains("Max Instability"));
        assert!(table.contains("Shapley"));

        let empty: Vec<ExcessSummaryRow> = Vec::new();
        assert_eq!(format_summary_table(&empty, None), "(no rows)");
        assert_eq!(
            format_summary_table(&empty, Some("Excess")),
            "Excess (rows: 0)\n────────────────\n(no rows)"
        );
    }
}
