//! File parsing functionality for allocation result tables
//!
//! This module handles loading the comma separated result files produced by the
//! allocation runs into typed records.

use crate::common::data_structures::ScenarioRecord;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during file parsing
#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("Failed to read input file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing expected column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("Input table contains no rows")]
    EmptyTable,
}

type Result<T> = core::result::Result<T, ParsingError>;

/// Parse a result table from a CSV file on disk
///
/// # Arguments
/// * `file_path` - Path to the CSV file (header row required)
///
/// # Returns
/// * `Ok(Vec<R>)` - All rows in file order
/// * `Err(ParsingError)` - If the file is missing, lacks a column, has a malformed row or is empty
pub fn parse_records<R>(file_path: &Path) -> Result<Vec<R>>
where
    R: DeserializeOwned + ScenarioRecord,
{
    let file = File::open(file_path)?;
    let records = parse_records_from_reader(file)?;
    debug!(
        path = %file_path.display(),
        rows = records.len(),
        "Loaded result table"
    );
    Ok(records)
}

/// Parse a result table from any reader
///
/// The header is validated against [`ScenarioRecord::COLUMNS`] before any row is
/// decoded, so a missing column is reported by name rather than as a row error.
/// Additional columns are ignored. Fields are taken verbatim, surrounding whitespace
/// included, so an identifier such as `" shapley "` is not matched to `shapley`.
pub fn parse_records_from_reader<R, Rd>(reader: Rd) -> Result<Vec<R>>
where
    R: DeserializeOwned + ScenarioRecord,
    Rd: std::io::Read,
{
    let mut reader = csv::ReaderBuilder::new().from_reader(reader);

    let headers = reader.headers()?;
    for &column in R::COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(ParsingError::MissingColumn { column });
        }
    }

    let records = reader
        .deserialize()
        .collect::<core::result::Result<Vec<R>, csv::Error>>()?;

    if records.is_empty() {
        return Err(ParsingError::EmptyTable);
    }

    Ok(records)
}
