//! Shape raw sheet rows into an [`AttributeTable`].
//!
//! Shared by the CSV and workbook readers: blank rows are dropped, a header
//! row is looked for near the top, and unnamed columns under a header are
//! discarded.

use tracing::debug;

use mos_model::table::{ATTRIBUTE_ALIASES, OBJECT_TYPE_ALIASES};
use mos_model::{AttributeTable, Cell};

/// How many leading rows are searched for a header row.
pub const HEADER_PROBE_ROWS: usize = 10;

fn header_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(value) => value.trim().trim_matches('\u{feff}').to_string(),
        Cell::Number(value) => value.to_string(),
        Cell::Int(value) => value.to_string(),
        Cell::Bool(value) => value.to_string(),
    }
}

fn matches_alias(cell: Option<&Cell>, aliases: &[&str]) -> bool {
    let Some(cell) = cell else {
        return false;
    };
    let key = header_text(cell).to_lowercase();
    aliases.iter().any(|alias| *alias == key)
}

/// Index of the header row: the first row within the probe window whose
/// first cell names the object-type column or whose second cell names the
/// attribute column.
pub fn detect_header_row(rows: &[Vec<Cell>]) -> Option<usize> {
    rows.iter().take(HEADER_PROBE_ROWS).position(|row| {
        matches_alias(row.first(), OBJECT_TYPE_ALIASES) || matches_alias(row.get(1), ATTRIBUTE_ALIASES)
    })
}

fn is_unnamed(header: &str) -> bool {
    header.is_empty() || header.starts_with("Unnamed")
}

/// Build a table from raw rows.
pub fn build_table(name: &str, rows: Vec<Vec<Cell>>) -> AttributeTable {
    let rows: Vec<Vec<Cell>> = rows
        .into_iter()
        .filter(|row| !row.iter().all(Cell::is_blank))
        .collect();

    let Some(header_index) = detect_header_row(&rows) else {
        debug!(table = name, rows = rows.len(), "no header row; positional layout");
        return AttributeTable::new(name, rows);
    };

    let headers: Vec<String> = rows[header_index].iter().map(header_text).collect();
    // The two role columns stay even when their header cell is blank.
    let keep: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(index, header)| *index < 2 || !is_unnamed(header))
        .map(|(index, _)| index)
        .collect();
    let dropped = headers.len() - keep.len();
    if dropped > 0 {
        debug!(table = name, columns = dropped, "unnamed columns dropped");
    }

    let kept_headers: Vec<String> = keep.iter().map(|&index| headers[index].clone()).collect();
    let data: Vec<Vec<Cell>> = rows
        .into_iter()
        .skip(header_index + 1)
        .map(|row| {
            keep.iter()
                .map(|&index| row.get(index).cloned().unwrap_or_default())
                .collect()
        })
        .filter(|row: &Vec<Cell>| !row.iter().all(Cell::is_blank))
        .collect();

    debug!(
        table = name,
        header_row = header_index,
        rows = data.len(),
        instance_columns = kept_headers.len().saturating_sub(2),
        "header row detected"
    );
    AttributeTable::with_headers(name, &kept_headers, data)
}
