//! Global constants shared by every object type.

use serde::{Deserialize, Serialize};

/// How the parser decides that a column starts a new instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryMode {
    /// Any attribute seen twice for an open instance starts a new one.
    #[default]
    RepeatedAttribute,
    /// Only identifier attributes (ending in the identifier delimiter) start a
    /// new instance; other repeats overwrite the earlier value.
    IdentifierRow,
}

/// Conventions of the source sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Suffix marking an attribute row as an identifier row (`Widget=`).
    pub identifier_delimiter: String,
    /// Separator between a compound base name and its sub-key (`pos_x`).
    pub compound_delimiter: String,
    /// Tokens that normalize to the empty value, compared case-insensitively.
    pub empty_tokens: Vec<String>,
    /// Prefix for references whose target cannot be found.
    pub unknown_placeholder: String,
    /// Render `TRUE`/`False` cells as `true`/`false`.
    pub lowercase_booleans: bool,
    pub boundary: BoundaryMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            identifier_delimiter: "=".to_string(),
            compound_delimiter: "_".to_string(),
            empty_tokens: vec!["nan".to_string(), "<empty>".to_string()],
            unknown_placeholder: "UNKNOWN_".to_string(),
            lowercase_booleans: true,
            boundary: BoundaryMode::default(),
        }
    }
}

impl Settings {
    pub fn is_empty_token(&self, value: &str) -> bool {
        self.empty_tokens
            .iter()
            .any(|token| token.eq_ignore_ascii_case(value))
    }

    /// True when the attribute name marks an identifier row.
    pub fn is_identifier_attribute(&self, attribute: &str) -> bool {
        !self.identifier_delimiter.is_empty() && attribute.ends_with(&self.identifier_delimiter)
    }

    /// Placeholder emitted for a reference to a missing instance.
    pub fn unknown(&self, target_id: &str) -> String {
        format!("{}{}", self.unknown_placeholder, target_id)
    }

    /// Split `base<delim>sub` into its parts. Names without the delimiter, or
    /// with an empty base or sub-key, are not compound.
    pub fn split_compound<'a>(&self, attribute: &'a str) -> Option<(&'a str, &'a str)> {
        if self.compound_delimiter.is_empty() {
            return None;
        }
        let (base, sub) = attribute.split_once(self.compound_delimiter.as_str())?;
        if base.is_empty() || sub.is_empty() {
            return None;
        }
        Some((base, sub))
    }
}

/// Header and footer of the assembled document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptSettings {
    pub title: String,
    /// Extra comment lines written after the title block.
    pub header: Vec<String>,
    /// Closing command sequence.
    pub footer: Vec<String>,
    pub comment_prefix: String,
    /// Write a comment above each block naming its source column.
    pub annotate_blocks: bool,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            title: "MO configuration script".to_string(),
            header: Vec::new(),
            footer: vec!["confb-".to_string(), "s-".to_string()],
            comment_prefix: "//".to_string(),
            annotate_blocks: true,
        }
    }
}

impl ScriptSettings {
    /// Format `text` as one comment line.
    pub fn comment(&self, text: &str) -> String {
        if text.is_empty() {
            self.comment_prefix.clone()
        } else {
            format!("{} {}", self.comment_prefix, text)
        }
    }
}
