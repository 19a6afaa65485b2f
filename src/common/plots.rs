//! Plotting infrastructure for scenario comparison charts
//!
//! A report is first described as a [`Figure`]: one [`Panel`] per scenario with its
//! categorical x-axis, markers and horizontal reference lines, plus the entries of the
//! shared legend. The figure is then rendered into an SVG document using the
//! [`plotters`] crate. Rendering happens in memory; the file is written in one go once
//! the whole document is complete.
//!
//! # Layout
//! * Subplots are arranged in a grid of at most [`MAX_COLUMNS`] columns, with as many
//!   rows as needed (see [`GridLayout`]).
//! * All subplots share the same y-range.
//! * The legend sits in a strip below the grid, centred horizontally.
//!
//! # Headless Compatibility
//! The SVG backend emits text as `<text>` elements and needs no system fonts, so charts
//! can be produced in containers and CI.

use crate::analysis::constants::{FIGURE_WIDTH, LEGEND_HEIGHT, MAX_COLUMNS, ROW_HEIGHT};
use crate::common::styles::BLACK;
use plotters::coord::Shift;
use plotters::prelude::{
    ChartBuilder, Circle, Color, DrawingArea, FontTransform, IntoDrawingArea, IntoFont,
    PathElement, Rectangle, SVGBackend, Text, WHITE,
};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::RGBColor;
use std::fs;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to save plot to file: {0}")]
    FileSave(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

type SvgArea<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Opacity of scatter markers
const MARKER_OPACITY: f64 = 0.8;

/// Radius of scatter markers in pixels
const MARKER_RADIUS: i32 = 5;

/// Number of dashes drawn across the width of a subplot
const DASHES_PER_PANEL: usize = 40;

/// Height below each subplot holding the vertical category names and the x-axis title
const X_LABEL_AREA_SIZE: u32 = 140;

/// Gap between the x-axis and the start of a category name
const CATEGORY_LABEL_GAP: i32 = 8;

/// A single scatter point
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Index into [`Panel::categories`]
    pub category: usize,
    pub value: f64,
    pub color: RGBColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

/// A horizontal line spanning the full width of a subplot
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    pub value: f64,
    pub color: RGBColor,
    pub width: u32,
    pub style: LineStyle,
}

/// A single subplot
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    /// Labels of the categorical x-axis, left to right
    pub categories: Vec<String>,
    /// Lines drawn behind the markers
    pub reference_lines: Vec<ReferenceLine>,
    pub markers: Vec<Marker>,
}

#[cfg(test)]
impl Panel {
    /// Y values of the markers placed in the given category
    pub fn values_in(&self, category: &str) -> Vec<f64> {
        match self.categories.iter().position(|c| c == category) {
            Some(index) => self
                .markers
                .iter()
                .filter(|marker| marker.category == index)
                .map(|marker| marker.value)
                .collect(),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendSymbol {
    Marker,
    DashedLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: RGBColor,
    pub symbol: LegendSymbol,
}

/// Rows and columns of the subplot grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: usize,
    pub columns: usize,
}

impl GridLayout {
    /// Sizes the grid for `count` subplots
    ///
    /// Uses up to [`MAX_COLUMNS`] columns and as many rows as needed. Four subplots
    /// give a 2x2 grid, five give 3x2 with one empty slot.
    pub fn for_panel_count(count: usize) -> Result<Self> {
        if count == 0 {
            return Err(PlotError::InvalidData(
                "At least one scenario is required".to_string(),
            ));
        }

        let columns = count.min(MAX_COLUMNS);
        let rows = count.div_ceil(columns);
        Ok(Self { rows, columns })
    }

    /// Total pixel size of a figure with this layout
    pub fn figure_size(&self) -> (u32, u32) {
        (FIGURE_WIDTH, ROW_HEIGHT * self.rows as u32 + LEGEND_HEIGHT)
    }
}

/// A complete chart: subplots, axis descriptions and the shared legend
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub panels: Vec<Panel>,
    pub x_desc: String,
    pub y_desc: String,
    pub legend: Vec<LegendEntry>,
}

impl Figure {
    /// Y-range shared by all subplots
    ///
    /// Covers every marker and reference line of every panel, padded by 5% on each
    /// side. A degenerate range is widened so the chart stays drawable.
    pub fn shared_y_range(&self) -> Range<f64> {
        let values = self.panels.iter().flat_map(|panel| {
            panel
                .markers
                .iter()
                .map(|marker| marker.value)
                .chain(panel.reference_lines.iter().map(|line| line.value))
        });

        let (min, max) = values
            .filter(|value| value.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
                (min.min(value), max.max(value))
            });

        if min > max {
            return 0.0..1.0;
        }

        let span = max - min;
        let padding = if span > 0.0 {
            span * 0.05
        } else {
            (max.abs() * 0.1).max(1.0)
        };

        (min - padding)..(max + padding)
    }

    /// Renders the figure into an SVG document
    ///
    /// # Returns
    /// * `Ok(String)` - The SVG document
    /// * `Err(PlotError)` - If the figure has no panels or drawing failed
    pub fn render_svg(&self) -> Result<String> {
        let layout = GridLayout::for_panel_count(self.panels.len())?;
        let size = layout.figure_size();
        let y_range = self.shared_y_range();

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

            let grid_height = (ROW_HEIGHT * layout.rows as u32) as i32;
            let (grid_area, legend_area) = root.split_vertically(grid_height);
            let cells = grid_area.split_evenly((layout.rows, layout.columns));

            for (panel, cell) in self.panels.iter().zip(cells.iter()) {
                self.draw_panel(panel, cell, y_range.clone())?;
            }

            draw_legend(&self.legend, &legend_area)?;

            root.present()
                .map_err(|e| PlotError::Drawing(e.to_string()))?;
        }

        Ok(svg)
    }

    /// Renders the figure and writes it to `output_path`
    pub fn save_svg(&self, output_path: &Path) -> Result<()> {
        let svg = self.render_svg()?;
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(output_path, svg)?;
        debug!(path = %output_path.display(), "Wrote figure");
        Ok(())
    }

    fn draw_panel(&self, panel: &Panel, area: &SvgArea<'_>, y_range: Range<f64>) -> Result<()> {
        let category_count = panel.categories.len().max(1);
        // Categories sit on integer positions, half a slot of space on both ends.
        let x_range = -0.5..(category_count as f64 - 0.5);

        let y_bottom = y_range.start;
        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(X_LABEL_AREA_SIZE)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range.clone(), y_range)
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

        // Ticks only; the names are drawn rotated below.
        chart
            .configure_mesh()
            .x_labels(category_count)
            .x_label_formatter(&|_: &f64| String::new())
            .y_label_formatter(&|y| format!("{:.2}", y))
            .x_desc(self.x_desc.as_str())
            .y_desc(self.y_desc.as_str())
            .label_style(("sans-serif", 12))
            .draw()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        // Long allocation labels overlap when laid out horizontally, so category names
        // run downwards from their tick.
        let label_style = ("sans-serif", 12)
            .into_font()
            .transform(FontTransform::Rotate90)
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));
        let (base_x, base_y) = area.get_base_pixel();
        for (index, category) in panel.categories.iter().enumerate() {
            let (x, y) = chart.backend_coord(&(index as f64, y_bottom));
            area.draw(&Text::new(
                category.clone(),
                (x - base_x, y - base_y + CATEGORY_LABEL_GAP),
                label_style.clone(),
            ))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
        }

        for line in panel.reference_lines.iter().filter(|line| line.value.is_finite()) {
            let style = line.color.stroke_width(line.width);
            let segments = match line.style {
                LineStyle::Solid => vec![(x_range.start, x_range.end)],
                LineStyle::Dashed => dash_segments(x_range.clone(), DASHES_PER_PANEL),
            };

            chart
                .draw_series(segments.into_iter().map(|(from, to)| {
                    PathElement::new(vec![(from, line.value), (to, line.value)], style)
                }))
                .map_err(|e| PlotError::Drawing(e.to_string()))?;
        }

        chart
            .draw_series(panel.markers.iter().filter(|m| m.value.is_finite()).map(|marker| {
                Circle::new(
                    (marker.category as f64, marker.value),
                    MARKER_RADIUS,
                    marker.color.mix(MARKER_OPACITY).filled(),
                )
            }))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        Ok(())
    }
}

/// Splits `range` into `dashes` dash segments separated by gaps of equal length
fn dash_segments(range: Range<f64>, dashes: usize) -> Vec<(f64, f64)> {
    let dashes = dashes.max(1);
    let step = (range.end - range.start) / (dashes * 2 - 1) as f64;
    (0..dashes)
        .map(|i| {
            let from = range.start + step * (2 * i) as f64;
            (from, from + step)
        })
        .collect()
}

/// Approximate pixel width of a legend entry (symbol, gap and label)
fn legend_entry_width(entry: &LegendEntry) -> i32 {
    let symbol = match entry.symbol {
        LegendSymbol::Marker => 16,
        LegendSymbol::DashedLine => 30,
    };
    symbol + 8 + entry.label.chars().count() as i32 * 7 + 20
}

fn draw_legend(entries: &[LegendEntry], area: &SvgArea<'_>) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }

    let (width, height) = area.dim_in_pixel();
    let total: i32 = entries.iter().map(legend_entry_width).sum();
    let left = ((width as i32 - total) / 2).max(10);
    let center_y = height as i32 / 2;

    area.draw(&Rectangle::new(
        [(left - 10, 8), (left + total, height as i32 - 8)],
        BLACK.mix(0.3).stroke_width(1),
    ))
    .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let mut x = left;
    for entry in entries {
        let symbol_width = match entry.symbol {
            LegendSymbol::Marker => {
                area.draw(&Circle::new(
                    (x + 8, center_y),
                    MARKER_RADIUS,
                    entry.color.mix(MARKER_OPACITY).filled(),
                ))
                .map_err(|e| PlotError::Drawing(e.to_string()))?;
                16
            }
            LegendSymbol::DashedLine => {
                for dash in 0..3 {
                    let from = x + dash * 11;
                    area.draw(&PathElement::new(
                        vec![(from, center_y), (from + 7, center_y)],
                        entry.color.stroke_width(2),
                    ))
                    .map_err(|e| PlotError::Drawing(e.to_string()))?;
                }
                30
            }
        };

        area.draw(&Text::new(
            entry.label.clone(),
            (x + symbol_width + 8, center_y - 7),
            ("sans-serif", 14),
        ))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

        x += legend_entry_width(entry);
    }

    Ok(())
}
