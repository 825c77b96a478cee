//! Sparse table parsing.
//!
//! A table packs one instance per (object type, column). The object type is
//! forward-filled down column 0; a column starts a new instance of the same
//! object type when an attribute it already holds shows up again.

use indexmap::IndexMap;
use tracing::{debug, error};

use mos_model::{AttributeTable, Diagnostic, RawInstance, SourceColumn, TableError};
use mos_policy::{BoundaryMode, Settings};

use crate::normalize::normalize;

/// Instances parsed from a set of tables, plus one diagnostic per rejected table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTables {
    pub instances: Vec<RawInstance>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Effective object type of each row after forward-fill; `None` above the
/// first non-blank object type.
pub fn effective_object_types(table: &AttributeTable, settings: &Settings) -> Vec<Option<String>> {
    let mut current: Option<String> = None;
    (0..table.rows.len())
        .map(|row| {
            let value = normalize(table.cell(row, table.layout.object_type), settings);
            if !value.is_empty() {
                current = Some(value);
            }
            current.clone()
        })
        .collect()
}

#[derive(Debug, Default)]
struct Accumulator {
    ordinal: usize,
    attributes: IndexMap<String, String>,
}

impl Accumulator {
    fn take(&mut self, object_type: &str, source: &SourceColumn) -> RawInstance {
        let instance = RawInstance {
            object_type: object_type.to_string(),
            source: source.clone(),
            ordinal: self.ordinal,
            attributes: std::mem::take(&mut self.attributes),
        };
        self.ordinal += 1;
        instance
    }
}

fn is_boundary(attribute: &str, settings: &Settings) -> bool {
    match settings.boundary {
        BoundaryMode::RepeatedAttribute => true,
        BoundaryMode::IdentifierRow => settings.is_identifier_attribute(attribute),
    }
}

/// Parse one table into raw instances, ordered by column and then by the
/// order in which instances were completed.
pub fn parse_table(
    table: &AttributeTable,
    settings: &Settings,
) -> Result<Vec<RawInstance>, TableError> {
    table.validate()?;

    let object_types = effective_object_types(table, settings);
    let attributes: Vec<String> = (0..table.rows.len())
        .map(|row| normalize(table.cell(row, table.layout.attribute), settings))
        .collect();

    let orphan_rows = object_types.iter().take_while(|value| value.is_none()).count();
    if orphan_rows > 0 {
        debug!(
            table = %table.name,
            rows = orphan_rows,
            "rows before the first object type ignored"
        );
    }

    let mut instances = Vec::new();
    for column in &table.layout.instances {
        let source = SourceColumn {
            table: table.name.clone(),
            index: column.index,
            header: column.header.clone(),
        };
        let mut open: IndexMap<String, Accumulator> = IndexMap::new();

        for (row, attribute) in attributes.iter().enumerate() {
            let Some(object_type) = object_types[row].as_deref() else {
                continue;
            };
            if attribute.is_empty() {
                continue;
            }
            let value = normalize(table.cell(row, column.index), settings);
            if value.is_empty() {
                continue;
            }

            let accumulator = open.entry(object_type.to_string()).or_default();
            if accumulator.attributes.contains_key(attribute) {
                if is_boundary(attribute, settings) {
                    instances.push(accumulator.take(object_type, &source));
                } else {
                    debug!(
                        table = %table.name,
                        column = %source.header,
                        object_type,
                        attribute = %attribute,
                        "repeated attribute overwrites earlier value"
                    );
                }
            }
            accumulator.attributes.insert(attribute.clone(), value);
        }

        for (object_type, mut accumulator) in open {
            if !accumulator.attributes.is_empty() {
                instances.push(accumulator.take(&object_type, &source));
            }
        }
    }

    debug!(table = %table.name, instances = instances.len(), "parsed table");
    Ok(instances)
}

/// Parse every table. A malformed table is reported and skipped; the others
/// are unaffected.
pub fn parse_tables(tables: &[AttributeTable], settings: &Settings) -> ParsedTables {
    let mut parsed = ParsedTables::default();
    for table in tables {
        match parse_table(table, settings) {
            Ok(instances) => parsed.instances.extend(instances),
            Err(err) => {
                error!(table = %table.name, error = %err, "malformed table skipped");
                parsed.diagnostics.push(Diagnostic::from(err));
            }
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<&str>>) -> AttributeTable {
        AttributeTable::from_strings("Sheet1", rows)
    }

    fn attrs(instance: &RawInstance) -> Vec<(&str, &str)> {
        instance
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn object_type_is_forward_filled() {
        let table = table(vec![
            vec!["", "orphan", "x"],
            vec!["Widget", "color", "red"],
            vec!["", "size", "L"],
            vec!["Gadget", "mode", "on"],
            vec!["  ", "level", "3"],
        ]);
        let types = effective_object_types(&table, &Settings::default());
        assert_eq!(
            types,
            vec![
                None,
                Some("Widget".to_string()),
                Some("Widget".to_string()),
                Some("Gadget".to_string()),
                Some("Gadget".to_string()),
            ]
        );
    }

    #[test]
    fn empty_cells_only_skip_their_column() {
        let table = table(vec![
            vec!["Widget", "color", "red", ""],
            vec!["Widget", "size", "", "XL"],
        ]);
        let instances = parse_table(&table, &Settings::default()).expect("parse");
        assert_eq!(instances.len(), 2);
        assert_eq!(attrs(&instances[0]), vec![("color", "red")]);
        assert_eq!(attrs(&instances[1]), vec![("size", "XL")]);
        assert_eq!(instances[1].source.header, "D");
    }

    #[test]
    fn columns_without_values_produce_nothing() {
        let table = table(vec![
            vec!["Widget", "color", "", "red"],
            vec!["Widget", "size", "nan", "L"],
        ]);
        let instances = parse_table(&table, &Settings::default()).expect("parse");
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].source.index, 3);
    }

    #[test]
    fn repeated_attribute_starts_new_instance() {
        let table = table(vec![
            vec!["Cell", "Cell=", "C1"],
            vec!["", "tac", "10"],
            vec!["", "Cell=", "C2"],
            vec!["", "tac", "20"],
        ]);
        let instances = parse_table(&table, &Settings::default()).expect("parse");
        assert_eq!(instances.len(), 2);
        assert_eq!(attrs(&instances[0]), vec![("Cell=", "C1"), ("tac", "10")]);
        assert_eq!(attrs(&instances[1]), vec![("Cell=", "C2"), ("tac", "20")]);
        assert_eq!(instances[0].ordinal, 0);
        assert_eq!(instances[1].ordinal, 1);
    }

    #[test]
    fn identifier_row_mode_overwrites_other_repeats() {
        let settings = Settings {
            boundary: BoundaryMode::IdentifierRow,
            ..Settings::default()
        };
        let table = table(vec![
            vec!["Cell", "Cell=", "C1"],
            vec!["", "tac", "10"],
            vec!["", "tac", "11"],
            vec!["", "Cell=", "C2"],
            vec!["", "tac", "20"],
        ]);
        let instances = parse_table(&table, &settings).expect("parse");
        assert_eq!(instances.len(), 2);
        assert_eq!(attrs(&instances[0]), vec![("Cell=", "C1"), ("tac", "11")]);
        assert_eq!(attrs(&instances[1]), vec![("Cell=", "C2"), ("tac", "20")]);
    }

    #[test]
    fn open_instances_flush_in_first_appearance_order() {
        let table = table(vec![
            vec!["Gadget", "mode", "on"],
            vec!["Widget", "color", "red"],
            vec!["Gadget", "level", "2"],
        ]);
        let instances = parse_table(&table, &Settings::default()).expect("parse");
        let types: Vec<&str> = instances.iter().map(|i| i.object_type.as_str()).collect();
        assert_eq!(types, vec!["Gadget", "Widget"]);
        assert_eq!(attrs(&instances[0]), vec![("mode", "on"), ("level", "2")]);
    }

    #[test]
    fn malformed_tables_do_not_stop_others() {
        let good = table(vec![vec!["Widget", "color", "red"]]);
        let empty = AttributeTable::new("Empty", Vec::new());
        let parsed = parse_tables(&[empty, good], &Settings::default());
        assert_eq!(parsed.instances.len(), 1);
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].code(), "malformed-table");
    }

    #[test]
    fn single_column_table_is_malformed() {
        let narrow = AttributeTable::from_strings("Narrow", vec![vec!["Widget"], vec!["Gadget"]]);
        let good = table(vec![vec!["Widget", "color", "red"]]);
        let parsed = parse_tables(&[narrow, good], &Settings::default());
        assert_eq!(parsed.instances.len(), 1);
        assert_eq!(
            parsed.diagnostics,
            vec![Diagnostic::MalformedTable {
                table: "Narrow".to_string(),
                reason: "table 'Narrow' has 1 column(s); at least two are required".to_string(),
            }]
        );
    }
}
