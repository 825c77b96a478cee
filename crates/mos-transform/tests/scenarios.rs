//! End-to-end transformation scenarios: table in, projected attributes out.

use mos_model::{AttributeTable, AttributeValue, Cell, IdSource};
use mos_policy::{OrderingPolicy, PolicyCatalog, ReferenceRule, Settings};
use mos_transform::{parse_table, parse_tables, project, resolve_all};

fn widget_table() -> AttributeTable {
    AttributeTable::from_strings(
        "Widgets",
        vec![
            vec!["Widget", "Widget=", "", "W1", "W2"],
            vec!["Widget", "color", "", "red", "blue"],
        ],
    )
}

#[test]
fn two_columns_yield_two_widgets() {
    let instances = parse_table(&widget_table(), &Settings::default()).expect("parse");
    assert_eq!(instances.len(), 2);

    let catalog = PolicyCatalog::from_policies(vec![OrderingPolicy::new("Widget")]).expect("catalog");
    let set = resolve_all(&instances, &catalog);
    let ids: Vec<&str> = set.records.iter().map(|r| r.instance_id.as_str()).collect();
    assert_eq!(ids, vec!["W1", "W2"]);

    let first = &set.records[0];
    let attrs: Vec<(&str, String)> = first
        .attributes
        .iter()
        .map(|(k, v)| (k.as_str(), v.render()))
        .collect();
    assert_eq!(
        attrs,
        vec![("Widget=", "W1".to_string()), ("color", "red".to_string())]
    );
    assert_eq!(set.records[1].get("color"), Some(&AttributeValue::scalar("blue")));
    assert!(set.diagnostics.is_empty());
}

#[test]
fn mandatory_size_is_emitted_empty() {
    let table = AttributeTable::from_strings(
        "Widgets",
        vec![vec!["Widget", "Widget=", "W1"], vec!["Widget", "color", "red"]],
    );
    let policy = OrderingPolicy::new("Widget")
        .with_order(["color", "size"])
        .with_mandatory(["size"]);
    let catalog = PolicyCatalog::from_policies(vec![policy.clone()]).expect("catalog");
    let instances = parse_table(&table, &catalog.settings).expect("parse");
    let set = resolve_all(&instances, &catalog);
    let lines: Vec<String> = project(&set.records[0], &policy)
        .iter()
        .map(|attr| format!("{} {}", attr.name, attr.value.render()))
        .collect();
    assert_eq!(lines, vec!["color red", "size "]);
}

#[test]
fn pos_rows_become_one_compound() {
    let table = AttributeTable::from_strings(
        "Widgets",
        vec![
            vec!["Widget", "Widget=", "W1"],
            vec!["Widget", "pos_y", "2"],
            vec!["Widget", "pos_x", "1"],
        ],
    );
    let catalog = PolicyCatalog::from_policies(vec![OrderingPolicy::new("Widget")]).expect("catalog");
    let instances = parse_table(&table, &catalog.settings).expect("parse");
    let set = resolve_all(&instances, &catalog);
    let pos = set.records[0].get("pos").expect("compound");
    assert!(matches!(pos, AttributeValue::Compound(_)));
    assert_eq!(pos.render(), "x=1,y=2");
    assert!(set.records[0].get("pos_x").is_none());
}

#[test]
fn missing_reference_target_is_a_warning() {
    let table = AttributeTable::from_strings(
        "Widgets",
        vec![vec!["Widget", "Widget=", "W1"], vec!["Widget", "ref", "NOPE"]],
    );
    let widget = OrderingPolicy::new("Widget")
        .with_order(["ref"])
        .with_reference("ref", ReferenceRule::by_id("Widget"));
    let catalog = PolicyCatalog::from_policies(vec![widget.clone()]).expect("catalog");
    let instances = parse_table(&table, &catalog.settings).expect("parse");
    let set = resolve_all(&instances, &catalog);

    let lines: Vec<String> = project(&set.records[0], &widget)
        .iter()
        .map(|attr| format!("{} {}", attr.name, attr.value.render()))
        .collect();
    assert_eq!(lines, vec!["ref UNKNOWN_NOPE"]);
    assert_eq!(set.diagnostics.len(), 1);
    assert_eq!(set.diagnostics[0].code(), "unresolved-reference");
}

#[test]
fn instances_in_different_tables_reference_each_other() {
    let carriers = AttributeTable::from_strings(
        "Carriers",
        vec![vec!["Carrier", "Carrier=", "7"], vec!["Carrier", "band", "n78"]],
    );
    let cells = AttributeTable::from_strings(
        "Cells",
        vec![vec!["Cell", "Cell=", "C1"], vec!["Cell", "carrierRef", "Carrier=7"]],
    );
    let catalog = PolicyCatalog::from_policies(vec![
        OrderingPolicy::new("Carrier").with_parent("DU=1"),
        OrderingPolicy::new("Cell")
            .with_reference("carrierRef", ReferenceRule::by_id("Carrier").with_borrow(["band"])),
    ])
    .expect("catalog");
    let parsed = parse_tables(&[cells, carriers], &catalog.settings);
    let set = resolve_all(&parsed.instances, &catalog);
    let cell = set.of_type("Cell").next().expect("cell");
    assert_eq!(
        cell.get("carrierRef").map(AttributeValue::render).as_deref(),
        Some("DU=1,Carrier=7")
    );
    assert_eq!(cell.get("band").map(AttributeValue::render).as_deref(), Some("n78"));
}

#[test]
fn numeric_cells_feed_identifiers() {
    let table = AttributeTable::new(
        "Numbers",
        vec![
            vec![Cell::from("Carrier"), Cell::from("Carrier="), Cell::Number(3.0)],
            vec![Cell::Empty, Cell::from("power"), Cell::Number(20.5)],
            vec![Cell::Empty, Cell::from("enabled"), Cell::Bool(true)],
        ],
    );
    let catalog = PolicyCatalog::from_policies(vec![OrderingPolicy::new("Carrier")]).expect("catalog");
    let instances = parse_table(&table, &catalog.settings).expect("parse");
    let set = resolve_all(&instances, &catalog);
    let record = &set.records[0];
    assert_eq!(record.instance_id, "3");
    assert_eq!(record.id_source, IdSource::IdentifierRow);
    assert_eq!(record.get("power"), Some(&AttributeValue::scalar("20.5")));
    assert_eq!(record.get("enabled"), Some(&AttributeValue::scalar("true")));
}
