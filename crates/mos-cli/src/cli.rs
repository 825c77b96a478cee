//! CLI argument definitions for the `mos` binary.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "mos",
    version,
    about = "Compile spreadsheet attribute tables into MO command scripts",
    long_about = "Compile sparse spreadsheet tables (object type, attribute, one column \
                  per instance) into an ordered MO command script.\n\n\
                  Reads CSV files and workbooks (.xlsx, .xlsm, .xlsb, .xls, .ods). \
                  Ordering and rendering rules come from a TOML policy catalog."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile input tables into one script.
    Compile(CompileArgs),

    /// List the object types of a policy catalog, in section order.
    Policies(PoliciesArgs),
}

#[derive(Parser, Debug, Clone, Default)]
pub struct CompileArgs {
    /// Input files; every sheet or file becomes one table.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Policy catalog (TOML). Defaults to the bundled catalog.
    #[arg(long = "policy", value_name = "FILE")]
    pub policy: Option<PathBuf>,

    /// Only read these workbook sheets, in this order (repeatable).
    #[arg(long = "sheet", value_name = "NAME")]
    pub sheets: Vec<String>,

    /// Write the script here instead of stdout.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Site name for the script header.
    #[arg(long = "site", value_name = "NAME")]
    pub site: Option<String>,

    /// Date for the script header (default: today).
    #[arg(long = "date", value_name = "YYYY-MM-DD", conflicts_with = "no_date")]
    pub date: Option<NaiveDate>,

    /// Leave the date out of the script header.
    #[arg(long = "no-date")]
    pub no_date: bool,

    /// Emit a section for every policy, even without instances.
    #[arg(long = "empty-sections")]
    pub empty_sections: bool,

    /// Exit with status 2 when any diagnostic was raised.
    #[arg(long = "deny-warnings")]
    pub deny_warnings: bool,
}

#[derive(Parser, Debug, Clone, Default)]
pub struct PoliciesArgs {
    /// Policy catalog (TOML). Defaults to the bundled catalog.
    #[arg(long = "policy", value_name = "FILE")]
    pub policy: Option<PathBuf>,

    /// Print the catalog as TOML instead of a table.
    #[arg(long = "toml")]
    pub toml: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
