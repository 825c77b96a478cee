//! End-to-end compilation against the bundled catalog.

use chrono::NaiveDate;

use mos_core::{CompileOptions, compile};
use mos_model::{AttributeTable, Cell, Diagnostic};
use mos_policy::PolicyCatalog;

fn node() -> AttributeTable {
    AttributeTable::from_strings(
        "Node",
        vec![
            vec!["ENodeBFunction", "eNodeBFunctionId", "1"],
            vec!["", "eNBId", "4321.0"],
            vec!["", "userLabel", "LIM001"],
            vec!["TermPointToMme", "TermPointToMme=", "MME1"],
        ],
    )
}

fn carriers() -> AttributeTable {
    AttributeTable::from_strings(
        "Carriers",
        vec![
            vec!["SectorCarrier", "SectorCarrier=", "1", "2"],
            vec![
                "SectorCarrier",
                "sectorFunctionRef",
                "SectorEquipmentFunction=1",
                "SectorEquipmentFunction=2",
            ],
            vec!["SectorCarrier", "noOfTxAntennas", "4", "2"],
        ],
    )
}

fn cells() -> AttributeTable {
    let headers: Vec<String> = ["MO", "Atributo", "LIM001 S1", "LIM001 S3"]
        .iter()
        .map(|header| header.to_string())
        .collect();
    let rows: Vec<Vec<Cell>> = vec![
        ["EUtranCellFDD", "EUtranCellFDD=", "LIM001_1", "LIM001_3"],
        ["EUtranCellFDD", "cellId", "1", "3"],
        ["EUtranCellFDD", "earfcndl", "3150", "3150"],
        ["EUtranCellFDD", "tac", "1201", ""],
        ["EUtranCellFDD", "cellDefinedPrimaryPlmnId", "mcc=716,mnc=10", "mcc=716,mnc=10"],
        ["EUtranCellFDD", "eutranCellCoverage_posCellRadius", "500", "500"],
        ["EUtranCellFDD", "eutranCellCoverage_posCellBearing", "90", "210"],
        ["EUtranCellFDD", "eutranCellPolygon_cornerLatitude", "-12.1 -12.2", "-12.3"],
        ["EUtranCellFDD", "eutranCellPolygon_cornerLongitude", "-77.1 -77.2", "-77.3 -77.4"],
        ["EUtranCellFDD", "changeNotification_enabled", "TRUE", "false"],
        ["EUtranCellFDD", "qRxLevMin", "-140", "-140"],
    ]
    .into_iter()
    .map(|row| row.into_iter().map(Cell::from).collect())
    .collect();
    AttributeTable::with_headers("Cells", &headers, rows)
}

fn options() -> CompileOptions {
    CompileOptions::new()
        .with_site("LIM001")
        .with_date(NaiveDate::from_ymd_opt(2025, 1, 15).expect("date"))
}

#[test]
fn lte_site_snapshot() {
    let catalog = PolicyCatalog::bundled().expect("bundled catalog");
    let compilation = compile(&[node(), carriers(), cells()], &catalog, &options());

    insta::assert_snapshot!(compilation.document, @r"
    // MO configuration script
    // SITE: LIM001
    // DATE: 2025-01-15

    // DIAGNOSTICS (2)
    // WARNING unresolved-reference: EUtranCellFDD=LIM001_3 sectorCarrierRef points to unknown SectorCarrier=3
    // WARNING policy-gap: no policy for object type 'TermPointToMme'; 1 instance(s) skipped

    ################################################################
    ## ENodeBFunction
    ################################################################
    // ENodeBFunction=1 (Node!C)
    set ENodeBFunction=1 eNBId 4321
    set ENodeBFunction=1 userLabel LIM001

    ################################################################
    ## ENodeBFunction=1 -> SectorCarrier
    ################################################################
    // ENodeBFunction=1,SectorCarrier=1 (Carriers!C)
    crn ENodeBFunction=1,SectorCarrier=1
    sectorFunctionRef SectorEquipmentFunction=1
    noOfTxAntennas 4
    end

    // ENodeBFunction=1,SectorCarrier=2 (Carriers!D)
    crn ENodeBFunction=1,SectorCarrier=2
    sectorFunctionRef SectorEquipmentFunction=2
    noOfTxAntennas 2
    end

    ################################################################
    ## ENodeBFunction=1 -> EUtranCellFDD
    ################################################################
    // ENodeBFunction=1,EUtranCellFDD=LIM001_1 (Cells!LIM001 S1)
    crn ENodeBFunction=1,EUtranCellFDD=LIM001_1
    cellId 1
    earfcndl 3150
    sectorCarrierRef ENodeBFunction=1,SectorCarrier=1
    tac 1201
    cellDefinedPrimaryPlmnId mcc=716,mnc=10
    end
    set ENodeBFunction=1,EUtranCellFDD=LIM001_1 eutranCellCoverage posCellBearing=90
    set ENodeBFunction=1,EUtranCellFDD=LIM001_1 eutranCellCoverage posCellRadius=500
    set ENodeBFunction=1,EUtranCellFDD=LIM001_1 eutranCellPolygon cornerLatitude=-12.1,cornerLongitude=-77.1;cornerLatitude=-12.2,cornerLongitude=-77.2
    set ENodeBFunction=1,EUtranCellFDD=LIM001_1 changeNotification enabled:b=true
    set ENodeBFunction=1,EUtranCellFDD=LIM001_1 qRxLevMin -140

    // ENodeBFunction=1,EUtranCellFDD=LIM001_3 (Cells!LIM001 S3)
    crn ENodeBFunction=1,EUtranCellFDD=LIM001_3
    cellId 3
    earfcndl 3150
    sectorCarrierRef UNKNOWN_3
    cellDefinedPrimaryPlmnId mcc=716,mnc=10
    end
    set ENodeBFunction=1,EUtranCellFDD=LIM001_3 eutranCellCoverage posCellBearing=210
    set ENodeBFunction=1,EUtranCellFDD=LIM001_3 eutranCellCoverage posCellRadius=500
    set ENodeBFunction=1,EUtranCellFDD=LIM001_3 eutranCellPolygon cornerLatitude=0,cornerLongitude=0
    set ENodeBFunction=1,EUtranCellFDD=LIM001_3 changeNotification enabled:b=false
    set ENodeBFunction=1,EUtranCellFDD=LIM001_3 qRxLevMin -140

    confb-
    s-
    ");
}

#[test]
fn section_summaries_follow_catalog_order() {
    let catalog = PolicyCatalog::bundled().expect("bundled catalog");
    let compilation = compile(&[cells(), carriers(), node()], &catalog, &options());
    let summary: Vec<(&str, usize, usize)> = compilation
        .sections
        .iter()
        .map(|section| (section.object_type.as_str(), section.instances, section.lines))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("ENodeBFunction", 1, 3),
            ("SectorCarrier", 2, 10),
            ("EUtranCellFDD", 2, 25),
        ]
    );
    assert_eq!(compilation.instance_count(), 5);
    assert!(!compilation.has_errors());
    assert_eq!(compilation.diagnostics.warning_count(), 2);

    let json = serde_json::to_value(&compilation.sections[0]).expect("serialize summary");
    assert_eq!(
        json,
        serde_json::json!({
            "object_type": "ENodeBFunction",
            "mode": "set-only",
            "instances": 1,
            "lines": 3,
        })
    );
}

#[test]
fn compiling_twice_is_byte_identical() {
    let catalog = PolicyCatalog::bundled().expect("bundled catalog");
    let tables = [node(), carriers(), cells()];
    let first = compile(&tables, &catalog, &options());
    let second = compile(&tables, &catalog, &options());
    assert_eq!(first, second);
}

#[test]
fn missing_identifier_falls_back_to_header() {
    let catalog = PolicyCatalog::bundled().expect("bundled catalog");
    let table = AttributeTable::from_strings(
        "Carriers",
        vec![vec!["SectorCarrier", "noOfTxAntennas", "4"]],
    );
    let compilation = compile(&[table], &catalog, &CompileOptions::default());
    let diagnostic = compilation.diagnostics.iter().next().expect("diagnostic");
    assert!(matches!(
        diagnostic,
        Diagnostic::MissingIdentifier { fallback_id, .. } if fallback_id == "C"
    ));
    assert!(compilation.document.contains("crn ENodeBFunction=1,SectorCarrier=C\n"));
    // sectorFunctionRef is mandatory and absent.
    assert!(compilation.document.contains("\nsectorFunctionRef \nnoOfTxAntennas 4\nend\n"));
}

#[test]
fn single_column_sheet_is_reported_in_the_script() {
    let catalog = PolicyCatalog::bundled().expect("bundled catalog");
    let notes = AttributeTable::from_strings("Notes", vec![vec!["ENodeBFunction"], vec!["remember LIM001"]]);
    let compilation = compile(&[notes, node()], &catalog, &options());

    assert!(compilation.has_errors());
    assert_eq!(
        compilation.diagnostics.iter().next().map(Diagnostic::code),
        Some("malformed-table")
    );
    assert!(compilation.document.contains(
        "// ERROR malformed-table: table 'Notes' has 1 column(s); at least two are required; table skipped\n"
    ));
    assert!(compilation.document.contains("set ENodeBFunction=1 eNBId 4321\n"));
}
