//! Attribute tables: the sparse, wide sheet layout the compiler consumes.
//!
//! A table has one object-type column, one attribute-name column and any
//! number of instance columns. Which physical column plays which role is
//! resolved once into a [`ColumnLayout`], so downstream code never does
//! positional arithmetic on raw rows.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::{Result, TableError};

/// Header names recognised for the object-type column.
pub const OBJECT_TYPE_ALIASES: &[&str] = &["mo", "object_type", "object type", "objecttype"];

/// Header names recognised for the attribute-name column.
pub const ATTRIBUTE_ALIASES: &[&str] = &[
    "atributo",
    "atributo_name",
    "parametro",
    "attribute",
    "attribute_name",
    "attribute name",
];

static EMPTY_CELL: Cell = Cell::Empty;

/// One value column of the sheet, carrying one instance per object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceColumn {
    /// Physical column index in the source rows.
    pub index: usize,
    /// Header text, or the spreadsheet column letter for headerless sheets.
    pub header: String,
}

/// Resolved roles of the physical columns of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub object_type: usize,
    pub attribute: usize,
    pub instances: Vec<InstanceColumn>,
}

impl ColumnLayout {
    /// Positional layout: column 0 is the object type, column 1 the attribute
    /// name, every further column an instance named by its column letter.
    pub fn positional(width: usize) -> Self {
        let instances = (2..width)
            .map(|index| InstanceColumn {
                index,
                header: column_letter(index),
            })
            .collect();
        Self {
            object_type: 0,
            attribute: 1,
            instances,
        }
    }

    /// Resolve column roles from header names.
    ///
    /// The object-type and attribute columns are found by alias; when an alias
    /// is missing the positional default (0 and 1) is used. Every other column
    /// becomes an instance column; blank headers fall back to the column letter.
    pub fn from_headers(headers: &[String]) -> Self {
        let find = |aliases: &[&str]| {
            headers.iter().position(|header| {
                let key = header.trim().to_lowercase();
                aliases.iter().any(|alias| *alias == key)
            })
        };
        let object_type = find(OBJECT_TYPE_ALIASES).unwrap_or(0);
        let attribute = find(ATTRIBUTE_ALIASES)
            .filter(|idx| *idx != object_type)
            .unwrap_or(if object_type == 1 { 0 } else { 1 });
        let instances = headers
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != object_type && *index != attribute)
            .map(|(index, header)| {
                let trimmed = header.trim();
                InstanceColumn {
                    index,
                    header: if trimmed.is_empty() {
                        column_letter(index)
                    } else {
                        trimmed.to_string()
                    },
                }
            })
            .collect();
        Self {
            object_type,
            attribute,
            instances,
        }
    }

    /// Number of physical columns the layout refers to.
    pub fn width(&self) -> usize {
        let roles = self.object_type.max(self.attribute) + 1;
        self.instances
            .iter()
            .map(|column| column.index + 1)
            .max()
            .unwrap_or(0)
            .max(roles)
    }
}

/// A source sheet: raw rows plus the resolved column layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeTable {
    /// Logical sheet name, used in diagnostics and instance provenance.
    pub name: String,
    pub layout: ColumnLayout,
    pub rows: Vec<Vec<Cell>>,
}

impl AttributeTable {
    /// Build a headerless table with the positional layout.
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            name: name.into(),
            layout: ColumnLayout::positional(width),
            rows,
        }
    }

    /// Build a table whose column roles are resolved from a header row.
    pub fn with_headers(name: impl Into<String>, headers: &[String], rows: Vec<Vec<Cell>>) -> Self {
        let mut layout = ColumnLayout::from_headers(headers);
        // Data rows may be wider than the header row; extra columns are instances too.
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for index in headers.len()..width {
            layout.instances.push(InstanceColumn {
                index,
                header: column_letter(index),
            });
        }
        Self {
            name: name.into(),
            layout,
            rows,
        }
    }

    /// Convenience constructor from string rows, mainly for tests and CSV input.
    pub fn from_strings<R, S>(name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|value| Cell::from(value.as_ref())).collect())
            .collect();
        Self::new(name, rows)
    }

    /// Physical width: the widest row or the layout width, whichever is larger.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(self.layout.width())
    }

    /// Cell at `(row, column)`; out-of-range positions read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Check the structural requirements: at least one row, at least two
    /// physical columns. Role columns the layout assumes do not count.
    pub fn validate(&self) -> Result<()> {
        if self.rows.is_empty() {
            return Err(TableError::Empty {
                table: self.name.clone(),
            });
        }
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns < 2 {
            return Err(TableError::TooFewColumns {
                table: self.name.clone(),
                columns,
            });
        }
        Ok(())
    }
}

/// Spreadsheet-style column letter for a zero-based index (`0` → `A`, `26` → `AA`).
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
