//! Common infrastructure modules shared by both reports
//!
//! This module provides reusable infrastructure for:
//! - Record types of the input tables
//! - Grouping rows by scenario and ordering axis categories
//! - Allocation display styles
//! - Rendering figures to SVG
//! - Console summary tables

pub mod data_structures;
pub mod grouping;
pub mod plots;
pub mod styles;
pub mod summary;
