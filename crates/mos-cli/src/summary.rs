//! Human-readable run summaries.
//!
//! The script itself may go to stdout, so compile summaries are written to
//! stderr.

use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use mos_core::Compilation;
use mos_model::{Diagnostic, EmissionMode, Severity};
use mos_policy::PolicyCatalog;

pub fn print_summary(compilation: &Compilation, output: Option<&Path>) {
    if let Some(path) = output {
        eprintln!("Output: {}", path.display());
    }
    eprintln!("{}", section_table(compilation));
    if !compilation.diagnostics.is_empty() {
        eprintln!("{}", diagnostic_table(compilation.diagnostics.as_slice()));
    }
}

pub fn print_policies(catalog: &PolicyCatalog) {
    println!("{}", policy_table(catalog));
}

/// One row per section plus a total row.
pub fn section_table(compilation: &Compilation) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Section"),
        header_cell("Mode"),
        header_cell("Instances"),
        header_cell("Lines"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);

    let mut total_lines = 0usize;
    for section in &compilation.sections {
        total_lines += section.lines;
        let instances = if section.instances == 0 {
            dim_cell(0)
        } else {
            Cell::new(section.instances)
        };
        table.add_row(vec![
            Cell::new(&section.object_type)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            mode_cell(section.mode),
            instances,
            Cell::new(section.lines),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(compilation.instance_count()).add_attribute(Attribute::Bold),
        Cell::new(total_lines).add_attribute(Attribute::Bold),
    ]);
    table
}

/// Diagnostics, errors first, otherwise in the order they were raised.
pub fn diagnostic_table(diagnostics: &[Diagnostic]) -> Table {
    let mut ordered: Vec<&Diagnostic> = diagnostics.iter().collect();
    ordered.sort_by_key(|diagnostic| diagnostic.severity());

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Code"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    for diagnostic in ordered {
        table.add_row(vec![
            severity_cell(diagnostic.severity()),
            Cell::new(diagnostic.code()),
            Cell::new(diagnostic.to_string()),
        ]);
    }
    table
}

pub fn policy_table(catalog: &PolicyCatalog) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Object type"),
        header_cell("Parent"),
        header_cell("Mode"),
        header_cell("Identifier"),
        header_cell("Ordered"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    for (index, policy) in catalog.policies().iter().enumerate() {
        let parent = match policy.parent.as_deref() {
            Some(parent) if !parent.is_empty() => Cell::new(parent),
            _ => dim_cell("-"),
        };
        let identifier = match policy.id_attribute.as_deref() {
            Some(id) => Cell::new(id),
            None => dim_cell("(default)"),
        };
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&policy.object_type).add_attribute(Attribute::Bold),
            parent,
            mode_cell(policy.mode),
            identifier,
            Cell::new(policy.order.len()),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn mode_cell(mode: EmissionMode) -> Cell {
    match mode {
        EmissionMode::SetOnly => Cell::new(mode.as_str()).fg(Color::DarkGrey),
        _ => Cell::new(mode.as_str()),
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new(severity.as_str())
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new(severity.as_str()).fg(Color::Yellow),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
