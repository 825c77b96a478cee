use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use mos_model::{AttributeTable, Cell};

use crate::error::{IngestError, Result};
use crate::sheet::build_table;

fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read a CSV file into one attribute table named after the file stem.
pub fn read_csv_table(path: &Path) -> Result<AttributeTable> {
    let file = std::fs::File::open(path).map_err(|source| IngestError::io(path, source))?;
    let table = read_csv_from(&table_name(path), file)?;
    debug!(path = %path.display(), rows = table.rows.len(), "read csv table");
    Ok(table)
}

/// Read CSV data from any reader. Rows may have different lengths.
pub fn read_csv_from<R: Read>(name: &str, reader: R) -> Result<AttributeTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::Csv {
            origin: name.to_string(),
            source,
        })?;
        rows.push(record.iter().map(Cell::from).collect::<Vec<_>>());
    }
    Ok(build_table(name, rows))
}
