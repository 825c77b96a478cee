use std::fmt;

use serde::{Deserialize, Serialize};

/// Structural form used to render an object type's instances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmissionMode {
    /// `cr <path>` followed by unlabelled positional values.
    CreateMinimal,
    /// `crn <path>`, one labelled line per attribute, `end`.
    #[default]
    CreateWithAttrs,
    /// `crn` block with the inline attributes, then `set` lines for the rest.
    CreateNamedBlock,
    /// Only `set` lines; the MO is assumed to exist.
    SetOnly,
}

impl EmissionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateMinimal => "create-minimal",
            Self::CreateWithAttrs => "create-with-attrs",
            Self::CreateNamedBlock => "create-named-block",
            Self::SetOnly => "set-only",
        }
    }
}

impl fmt::Display for EmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rendered commands for one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandBlock {
    pub mode: EmissionMode,
    pub object_type: String,
    pub instance_id: String,
    pub path: String,
    pub lines: Vec<String>,
}

impl CommandBlock {
    /// Lines joined with newlines, terminated by a newline.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}
