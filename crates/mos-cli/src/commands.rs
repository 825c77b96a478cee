use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, info_span};

use mos_core::{Compilation, CompileOptions, compile};
use mos_ingest::{SheetSelection, read_input};
use mos_model::AttributeTable;
use mos_policy::PolicyCatalog;

use crate::cli::{CompileArgs, PoliciesArgs};
use crate::summary::print_policies;

/// Exit status when `--deny-warnings` is set and diagnostics were raised.
pub const EXIT_DIAGNOSTICS: i32 = 2;

/// Result of a `compile` run.
#[derive(Debug)]
pub struct CompileOutcome {
    pub compilation: Compilation,
    /// Where the document went; `None` means stdout.
    pub output: Option<PathBuf>,
}

impl CompileOutcome {
    pub fn exit_code(&self, deny_warnings: bool) -> i32 {
        if deny_warnings && !self.compilation.diagnostics.is_empty() {
            EXIT_DIAGNOSTICS
        } else {
            0
        }
    }
}

/// The catalog at `path`, or the bundled one.
pub fn load_catalog(path: Option<&Path>) -> Result<PolicyCatalog> {
    match path {
        Some(path) => PolicyCatalog::load(path)
            .with_context(|| format!("load policy catalog {}", path.display())),
        None => PolicyCatalog::bundled().context("load bundled policy catalog"),
    }
}

/// Read every input, in argument order.
pub fn read_tables(inputs: &[PathBuf], sheets: &[String]) -> Result<Vec<AttributeTable>> {
    let selection = SheetSelection::named(sheets.iter().cloned());
    let mut tables = Vec::new();
    for input in inputs {
        let read = read_input(input, &selection)
            .with_context(|| format!("read input {}", input.display()))?;
        tables.extend(read);
    }
    Ok(tables)
}

fn compile_options(args: &CompileArgs) -> CompileOptions {
    let mut options = CompileOptions::new();
    if let Some(site) = &args.site {
        options = options.with_site(site.clone());
    }
    if !args.no_date {
        let date = args
            .date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        options = options.with_date(date);
    }
    if args.empty_sections {
        options = options.with_empty_sections();
    }
    options
}

fn write_document(document: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, document).with_context(|| format!("write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(document.as_bytes())
                .and_then(|()| stdout.flush())
                .context("write script to stdout")
        }
    }
}

pub fn run_compile(args: &CompileArgs) -> Result<CompileOutcome> {
    let span = info_span!("compile_run", inputs = args.inputs.len());
    let _guard = span.enter();

    let catalog = load_catalog(args.policy.as_deref())?;
    let tables = read_tables(&args.inputs, &args.sheets)?;
    info!(
        tables = tables.len(),
        policies = catalog.len(),
        "inputs loaded"
    );

    let compilation = compile(&tables, &catalog, &compile_options(args));
    write_document(&compilation.document, args.output.as_deref())?;
    if let Some(path) = &args.output {
        info!(path = %path.display(), bytes = compilation.document.len(), "script written");
    }

    Ok(CompileOutcome {
        compilation,
        output: args.output.clone(),
    })
}

pub fn run_policies(args: &PoliciesArgs) -> Result<()> {
    let catalog = load_catalog(args.policy.as_deref())?;
    if args.toml {
        let text = catalog
            .to_toml_string()
            .context("serialize policy catalog")?;
        print!("{text}");
    } else {
        print_policies(&catalog);
    }
    Ok(())
}
