use thiserror::Error;

/// Structural problems that make a whole table unusable.
///
/// A malformed table aborts processing of that table only; other tables of
/// the same run continue independently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("table '{table}' has no rows")]
    Empty { table: String },

    #[error("table '{table}' has {columns} column(s); at least two are required")]
    TooFewColumns { table: String, columns: usize },
}

impl TableError {
    pub fn table(&self) -> &str {
        match self {
            Self::Empty { table } | Self::TooFewColumns { table, .. } => table,
        }
    }
}

pub type Result<T> = std::result::Result<T, TableError>;
