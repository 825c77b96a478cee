use serde::{Deserialize, Serialize};

/// A raw spreadsheet value as read from a sheet, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// True for cells that carry no data at all (blank, or whitespace-only text).
    ///
    /// Sentinel tokens such as `nan` are not blank here; they only become empty
    /// during normalization, which depends on the configured token set.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(value) => value.trim().is_empty(),
            Self::Number(value) => value.is_nan(),
            Self::Int(_) | Self::Bool(_) => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_converts_to_empty_cell() {
        assert_eq!(Cell::from(""), Cell::Empty);
        assert_eq!(Cell::from("x"), Cell::Text("x".to_string()));
    }

    #[test]
    fn blank_detection() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::text("  \t").is_blank());
        assert!(Cell::Number(f64::NAN).is_blank());
        assert!(!Cell::text("nan").is_blank());
        assert!(!Cell::Int(0).is_blank());
        assert!(!Cell::Bool(false).is_blank());
    }
}
