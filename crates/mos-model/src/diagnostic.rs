//! Non-fatal findings collected during a compilation run.
//!
//! Diagnostics never abort the run. They are logged and also written into the
//! assembled document as comments, since the document is the primary delivery
//! channel.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A table was rejected as a whole; other tables continued.
    MalformedTable { table: String, reason: String },
    /// No identifier could be derived; the column header was used instead.
    MissingIdentifier {
        object_type: String,
        column: String,
        fallback_id: String,
    },
    /// A reference names an instance that is not in the resolved set.
    UnresolvedReference {
        object_type: String,
        instance_id: String,
        attribute: String,
        target_type: String,
        target_id: String,
    },
    /// Instances of an object type without a policy entry were skipped.
    PolicyGap { object_type: String, instances: usize },
}

impl Diagnostic {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedTable { .. } => "malformed-table",
            Self::MissingIdentifier { .. } => "missing-identifier",
            Self::UnresolvedReference { .. } => "unresolved-reference",
            Self::PolicyGap { .. } => "policy-gap",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::MalformedTable { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl From<TableError> for Diagnostic {
    fn from(error: TableError) -> Self {
        Self::MalformedTable {
            table: error.table().to_string(),
            reason: error.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedTable { reason, .. } => write!(f, "{reason}; table skipped"),
            Self::MissingIdentifier {
                object_type,
                column,
                fallback_id,
            } => write!(
                f,
                "{object_type} in column '{column}' has no identifier; using '{fallback_id}'"
            ),
            Self::UnresolvedReference {
                object_type,
                instance_id,
                attribute,
                target_type,
                target_id,
            } => write!(
                f,
                "{object_type}={instance_id} {attribute} points to unknown {target_type}={target_id}"
            ),
            Self::PolicyGap {
                object_type,
                instances,
            } => write!(
                f,
                "no policy for object type '{object_type}'; {instances} instance(s) skipped"
            ),
        }
    }
}

/// Ordered collection of diagnostics with severity counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.items
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
            .count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.items.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
