//! Integration tests for the `compile` and `policies` commands.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use mos_cli::cli::CompileArgs;
use mos_cli::commands::{EXIT_DIAGNOSTICS, load_catalog, read_tables, run_compile};

const WIDGET_POLICY: &str = r#"
[script]
title = "Widget rollout"
footer = ["commit"]
annotate_blocks = false

[[policy]]
object_type = "Widget"
parent = "Site=1"
order = ["color", "size"]
"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn widget_args(dir: &Path, csv: &str) -> CompileArgs {
    CompileArgs {
        inputs: vec![write(dir, "widgets.csv", csv)],
        policy: Some(write(dir, "policy.toml", WIDGET_POLICY)),
        output: Some(dir.join("widgets.mos")),
        site: Some("LAB".to_string()),
        no_date: true,
        ..CompileArgs::default()
    }
}

#[test]
fn compile_writes_the_script_file() {
    let dir = TempDir::new().expect("temp dir");
    let args = widget_args(
        dir.path(),
        "MO,Atributo,W1,W2\nWidget,Widget=,W1,W2\nWidget,size,L,S\nWidget,color,red,blue\n",
    );

    let outcome = run_compile(&args).expect("compile");
    assert_eq!(outcome.exit_code(true), 0);
    assert_eq!(outcome.compilation.instance_count(), 2);

    let written = fs::read_to_string(dir.path().join("widgets.mos")).expect("read script");
    assert_eq!(written, outcome.compilation.document);
    assert!(written.starts_with("// Widget rollout\n// SITE: LAB\n"));
    assert!(written.contains("crn Site=1,Widget=W1\ncolor red\nsize L\nend\n"));
    assert!(written.contains("crn Site=1,Widget=W2\ncolor blue\nsize S\nend\n"));
    assert!(written.ends_with("commit\n"));
}

#[test]
fn deny_warnings_reports_policy_gaps() {
    let dir = TempDir::new().expect("temp dir");
    let args = widget_args(
        dir.path(),
        "Widget,Widget=,W1\nWidget,color,red\nGizmo,Gizmo=,G1\n",
    );

    let outcome = run_compile(&args).expect("compile");
    assert_eq!(outcome.compilation.diagnostics.len(), 1);
    assert_eq!(outcome.exit_code(false), 0);
    assert_eq!(outcome.exit_code(true), EXIT_DIAGNOSTICS);
    assert!(outcome.compilation.document.contains("policy-gap"));
}

#[test]
fn inputs_are_read_in_argument_order() {
    let dir = TempDir::new().expect("temp dir");
    let second = write(dir.path(), "b.csv", "Widget,Widget=,W2\n");
    let first = write(dir.path(), "a.csv", "Widget,Widget=,W1\n");

    let tables = read_tables(&[second, first], &[]).expect("read");
    let names: Vec<&str> = tables.iter().map(|table| table.name.as_str()).collect();
    assert_eq!(names, vec!["b", "a"]);
}

#[test]
fn unreadable_input_names_the_file() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("absent.csv");
    let err = read_tables(&[missing], &[]).expect_err("missing input");
    assert!(format!("{err:#}").contains("absent.csv"));
}

#[test]
fn bundled_catalog_is_the_default() {
    let catalog = load_catalog(None).expect("bundled");
    assert!(catalog.get("EUtranCellFDD").is_some());

    let dir = TempDir::new().expect("temp dir");
    let broken = write(dir.path(), "broken.toml", "[[policy]]\nobject_type = 3\n");
    let err = load_catalog(Some(broken.as_path())).expect_err("broken catalog");
    assert!(format!("{err:#}").contains("broken.toml"));
}
