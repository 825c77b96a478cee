//! Script assembler: header, diagnostics, sections, footer.

use chrono::NaiveDate;

use mos_model::{CommandBlock, Diagnostic};
use mos_policy::ScriptSettings;

const RULE: &str = "################################################################";

/// Run-specific header values. Both are supplied by the caller so the same
/// input always assembles to the same text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptHeader {
    pub site: Option<String>,
    pub date: Option<NaiveDate>,
}

impl ScriptHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// The blocks of one object type, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub object_type: String,
    /// Parent path shown in the banner, when the object type has one.
    pub parent: Option<String>,
    pub blocks: Vec<CommandBlock>,
}

impl Section {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            parent: None,
            blocks: Vec::new(),
        }
    }

    pub fn banner(&self) -> String {
        match self.parent.as_deref().filter(|parent| !parent.is_empty()) {
            Some(parent) => format!("## {parent} -> {}", self.object_type),
            None => format!("## {}", self.object_type),
        }
    }
}

/// Header comment block: title, site, date and the configured header lines.
pub fn header_lines(header: &ScriptHeader, script: &ScriptSettings) -> Vec<String> {
    let mut lines = vec![script.comment(&script.title)];
    if let Some(site) = &header.site {
        lines.push(script.comment(&format!("SITE: {site}")));
    }
    if let Some(date) = header.date {
        lines.push(script.comment(&format!("DATE: {}", date.format("%Y-%m-%d"))));
    }
    lines.extend(script.header.iter().map(|line| script.comment(line)));
    lines
}

/// One comment line per diagnostic, preceded by a count line. Empty when
/// there is nothing to report.
pub fn diagnostic_lines(diagnostics: &[Diagnostic], script: &ScriptSettings) -> Vec<String> {
    if diagnostics.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![script.comment(&format!("DIAGNOSTICS ({})", diagnostics.len()))];
    lines.extend(diagnostics.iter().map(|diagnostic| {
        script.comment(&format!(
            "{} {}: {diagnostic}",
            diagnostic.severity().as_str(),
            diagnostic.code()
        ))
    }));
    lines
}

/// Concatenate the document. Sections appear in the order given; blocks are
/// never interleaved across sections.
pub fn assemble(
    header: &ScriptHeader,
    diagnostics: &[Diagnostic],
    sections: &[Section],
    script: &ScriptSettings,
) -> String {
    let mut out = String::new();
    push_lines(&mut out, &header_lines(header, script));

    let diagnostics = diagnostic_lines(diagnostics, script);
    if !diagnostics.is_empty() {
        out.push('\n');
        push_lines(&mut out, &diagnostics);
    }

    for section in sections {
        out.push('\n');
        push_lines(&mut out, &[RULE.to_string(), section.banner(), RULE.to_string()]);
        if section.blocks.is_empty() {
            push_lines(&mut out, &[script.comment("no instances")]);
        }
        for (position, block) in section.blocks.iter().enumerate() {
            if position > 0 {
                out.push('\n');
            }
            out.push_str(&block.render());
        }
    }

    if !script.footer.is_empty() {
        out.push('\n');
        push_lines(&mut out, &script.footer);
    }
    out
}

fn push_lines(out: &mut String, lines: &[String]) {
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
}
