//! Spreadsheet workbooks through `calamine`.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use tracing::{debug, info};

use mos_model::{AttributeTable, Cell};

use crate::error::{IngestError, Result};
use crate::sheet::build_table;

/// Which sheets of a workbook become tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetSelection {
    /// Every sheet, in workbook order.
    #[default]
    All,
    /// The named sheets, in the given order. Missing names are an error.
    Named(Vec<String>),
}

impl SheetSelection {
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            Self::All
        } else {
            Self::Named(names)
        }
    }
}

/// Convert one workbook value. Dates keep their serial number; error cells
/// keep their error text.
pub fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(value) => Cell::Text(value.clone()),
        Data::Float(value) => Cell::Number(*value),
        Data::Int(value) => Cell::Int(*value),
        Data::Bool(value) => Cell::Bool(*value),
        Data::DateTime(value) => Cell::Number(value.as_f64()),
        Data::DateTimeIso(value) | Data::DurationIso(value) => Cell::Text(value.clone()),
        Data::Error(error) => Cell::Text(error.to_string()),
    }
}

/// Rows of a sheet range, padded so column positions match the sheet
/// (a range starts at its first used cell, not at `A1`).
fn range_rows(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let (top, left) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or((0, 0));
    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); top];
    rows.extend(range.rows().map(|row| {
        let mut cells = vec![Cell::Empty; left];
        cells.extend(row.iter().map(data_to_cell));
        cells
    }));
    rows
}

fn read_sheets<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    origin: &str,
    selection: &SheetSelection,
) -> Result<Vec<AttributeTable>> {
    let available = workbook.sheet_names();
    let names: Vec<String> = match selection {
        SheetSelection::All => available.clone(),
        SheetSelection::Named(names) => {
            if let Some(missing) = names.iter().find(|name| !available.contains(name)) {
                return Err(IngestError::MissingSheet {
                    origin: origin.to_string(),
                    sheet: missing.clone(),
                    available: available.join(", "),
                });
            }
            names.clone()
        }
    };

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|source| IngestError::Workbook {
                origin: format!("{origin}!{name}"),
                source,
            })?;
        let table = build_table(&name, range_rows(&range));
        debug!(workbook = origin, sheet = %name, rows = table.rows.len(), "read sheet");
        tables.push(table);
    }
    Ok(tables)
}

/// Read the selected sheets of a workbook file (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`).
pub fn read_xlsx_tables(path: &Path, selection: &SheetSelection) -> Result<Vec<AttributeTable>> {
    let origin = path.display().to_string();
    if !path.exists() {
        return Err(IngestError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        ));
    }
    let mut workbook = open_workbook_auto(path).map_err(|source| IngestError::Workbook {
        origin: origin.clone(),
        source,
    })?;
    let tables = read_sheets(&mut workbook, &origin, selection)?;
    info!(workbook = %origin, sheets = tables.len(), "read workbook");
    Ok(tables)
}

/// Read the selected sheets of an in-memory workbook (an upload, for example).
pub fn read_xlsx_bytes(
    bytes: &[u8],
    name: &str,
    selection: &SheetSelection,
) -> Result<Vec<AttributeTable>> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|source| {
            IngestError::Workbook {
                origin: name.to_string(),
                source,
            }
        })?;
    read_sheets(&mut workbook, name, selection)
}
