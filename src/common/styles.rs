//! Display labels and colours for allocation methods
//!
//! Each report has a fixed table mapping allocation identifiers found in the CSV files
//! to a human readable label and a marker colour. Identifiers missing from the table
//! still get plotted: they keep their raw identifier as label and take a colour from
//! [`FALLBACK_COLORS`] in order of first appearance.

use itertools::Itertools;
use plotters::style::RGBColor;

/// Display style of a single allocation method
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationStyle {
    /// Identifier as it appears in the `Allocation` column
    pub identifier: &'static str,
    /// Label shown in legends and on category axes
    pub label: &'static str,
    /// Marker colour
    pub color: RGBColor,
}

impl AllocationStyle {
    const fn new(identifier: &'static str, label: &'static str, color: RGBColor) -> Self {
        Self {
            identifier,
            label,
            color,
        }
    }
}

pub const RED: RGBColor = RGBColor(255, 0, 0);
pub const YELLOW: RGBColor = RGBColor(255, 255, 0);
pub const ORANGE: RGBColor = RGBColor(255, 165, 0);
pub const GREY: RGBColor = RGBColor(128, 128, 128);
pub const LIGHT_GREY: RGBColor = RGBColor(211, 211, 211);
pub const PINK: RGBColor = RGBColor(255, 192, 203);
pub const GREEN: RGBColor = RGBColor(0, 128, 0);
pub const BLUE: RGBColor = RGBColor(0, 0, 255);
pub const BLACK: RGBColor = RGBColor(0, 0, 0);

/// Colour of the dashed average relative imbalance line
pub const AVERAGE_LINE_COLOR: RGBColor = BLUE;

/// Colour of the solid zero line
pub const ZERO_LINE_COLOR: RGBColor = BLACK;

/// Styles used by the relative imbalance report
pub const RELATIVE_IMBALANCE_STYLES: &[AllocationStyle] = &[
    AllocationStyle::new("shapley", "Shapley", RED),
    AllocationStyle::new("VCG", "VCG", YELLOW),
    AllocationStyle::new("VCG_budget_balanced", "VCG Budget Balanced", ORANGE),
    AllocationStyle::new("gately_daily", "Gately Daily", GREY),
    AllocationStyle::new("gately_interval", "Gately 15Min interval", LIGHT_GREY),
    AllocationStyle::new("full_cost", "Full Cost", PINK),
    AllocationStyle::new("nucleolus", "Nucleolus", GREEN),
];

/// Styles used by the excess (max instability) report
pub const EXCESS_STYLES: &[AllocationStyle] = &[
    AllocationStyle::new("shapley", "Shapley", RED),
    AllocationStyle::new("VCG", "VCG", YELLOW),
    AllocationStyle::new("VCG_budget_balanced", "VCG Budget Balanced", ORANGE),
    AllocationStyle::new("gately_full", "Gately Full", GREY),
    AllocationStyle::new("gately_hourly", "Gately Hourly", LIGHT_GREY),
    AllocationStyle::new("full_cost", "Full Cost", PINK),
    AllocationStyle::new("nucleolus", "Nucleolus", GREEN),
];

/// Colour cycle for identifiers without a configured style (tab10)
pub const FALLBACK_COLORS: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Style resolved for one identifier
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub label: String,
    pub color: RGBColor,
}

/// Resolves allocation identifiers of one table against a style table
#[derive(Debug, Clone)]
pub struct StyleResolver {
    table: &'static [AllocationStyle],
    unknown: Vec<String>,
}

impl StyleResolver {
    /// Creates a resolver, assigning fallback colours to every identifier in
    /// `identifiers` which is not in `table`, in order of first appearance.
    pub fn new<'a>(
        table: &'static [AllocationStyle],
        identifiers: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let unknown = identifiers
            .into_iter()
            .filter(|identifier| !table.iter().any(|style| style.identifier == *identifier))
            .unique()
            .map(str::to_string)
            .collect();

        Self { table, unknown }
    }

    pub fn resolve(&self, identifier: &str) -> ResolvedStyle {
        if let Some(style) = self.table.iter().find(|style| style.identifier == identifier) {
            return ResolvedStyle {
                label: style.label.to_string(),
                color: style.color,
            };
        }

        let index = self
            .unknown
            .iter()
            .position(|unknown| unknown == identifier)
            .unwrap_or(self.unknown.len());

        ResolvedStyle {
            label: identifier.to_string(),
            color: FALLBACK_COLORS[index % FALLBACK_COLORS.len()],
        }
    }

    /// Identifiers seen in the data which have no configured style
    pub fn unknown_identifiers(&self) -> &[String] {
        &self.unknown
    }

    /// All styles that belong in a legend: the full table in table order, then the
    /// unknown identifiers in order of first appearance.
    pub fn legend_styles(&self) -> Vec<ResolvedStyle> {
        self.table
            .iter()
            .map(|style| self.resolve(style.identifier))
            .chain(self.unknown.iter().map(|identifier| self.resolve(identifier)))
            .collect()
    }
}
