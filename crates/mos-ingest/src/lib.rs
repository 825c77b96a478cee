#![deny(unsafe_code)]

//! Attribute table ingestion.
//!
//! Reads CSV files and spreadsheet workbooks into [`mos_model::AttributeTable`]s.
//! This is the only crate besides the CLI that touches the file system.
//!
//! - **csv_table**: one table per CSV file
//! - **workbook**: one table per selected sheet, via `calamine`
//! - **sheet**: header detection and column cleanup shared by both

pub mod csv_table;
pub mod error;
pub mod sheet;
pub mod workbook;

use std::path::Path;

use mos_model::AttributeTable;

pub use csv_table::{read_csv_from, read_csv_table};
pub use error::{IngestError, Result};
pub use sheet::{HEADER_PROBE_ROWS, build_table, detect_header_row};
pub use workbook::{SheetSelection, data_to_cell, read_xlsx_bytes, read_xlsx_tables};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Read an input file, choosing the reader from its extension.
///
/// The sheet selection only applies to workbooks; a CSV file always yields
/// exactly one table.
pub fn read_input(path: &Path, selection: &SheetSelection) -> Result<Vec<AttributeTable>> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if extension == "csv" {
        return Ok(vec![read_csv_table(path)?]);
    }
    if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        return read_xlsx_tables(path, selection);
    }
    Err(IngestError::UnsupportedFormat {
        path: path.to_path_buf(),
    })
}
