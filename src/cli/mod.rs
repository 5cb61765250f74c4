//! Command-line parsing for the composite index tool.
//!
//! Argument parsing and command dispatch stay separate from the engine so the
//! library can be driven without a CLI.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::{DEFAULT_WINDOW_YEARS, MAX_SELECTIONS, ResolutionPolicy, Selection, SourceKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cpi", version, about = "Weighted composite commodity price index")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the category catalog.
    Categories(CategoriesArgs),
    /// Build a composite index from weighted selections.
    Compute(ComputeArgs),
    /// Print a previously exported result JSON.
    Show(ShowArgs),
}

/// Catalog location options shared by subcommands.
#[derive(Debug, Parser, Clone)]
pub struct CatalogArgs {
    /// Catalog CSV (`category_2,category_3,series_id`). Defaults to `$CPI_CATALOG`, then `catalog.csv`.
    #[arg(long, value_name = "CSV")]
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct CategoriesArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Only list sub-categories of this category.
    #[arg(long = "category-2", value_name = "NAME")]
    pub category_2: Option<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct ComputeArgs {
    /// Selection as CATEGORY_2:CATEGORY_3:WEIGHT (repeat up to 10 times).
    #[arg(
        short = 's',
        long = "select",
        value_name = "C2:C3:W",
        required = true,
        num_args = 1,
        value_parser = parse_selection,
    )]
    pub selections: Vec<Selection>,

    /// How to handle a selection that matches several series.
    #[arg(long, value_enum, default_value_t = ResolutionPolicy::First)]
    pub policy: ResolutionPolicy,

    /// Resolve and fetch selections in parallel.
    #[arg(long)]
    pub parallel: bool,

    /// Rebase each constituent so its mean over this year is 100.
    #[arg(long, value_name = "YEAR")]
    pub rebase_year: Option<i32>,

    /// Trailing display window in years.
    #[arg(long, default_value_t = DEFAULT_WINDOW_YEARS)]
    pub years: u32,

    /// Show the full history instead of the trailing window.
    #[arg(long, conflicts_with = "years")]
    pub all_history: bool,

    /// Where observations come from.
    #[arg(long, value_enum, default_value_t = SourceKind::File)]
    pub source: SourceKind,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Observations CSV for `--source file`. Defaults to `$CPI_OBSERVATIONS`, then `observations.csv`.
    #[arg(long, value_name = "CSV")]
    pub observations: Option<PathBuf>,

    /// Number of most recent rows to print.
    #[arg(long, default_value_t = 24)]
    pub rows: usize,

    /// Export the full combined table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the full result (composite + constituents) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// Result JSON produced by `cpi compute --export-json`.
    #[arg(long, value_name = "JSON")]
    pub result: PathBuf,

    /// Trailing display window in years.
    #[arg(long, default_value_t = DEFAULT_WINDOW_YEARS)]
    pub years: u32,

    /// Show the full history instead of the trailing window.
    #[arg(long, conflicts_with = "years")]
    pub all_history: bool,

    /// Number of most recent rows to print.
    #[arg(long, default_value_t = 24)]
    pub rows: usize,
}

fn parse_selection(raw: &str) -> Result<Selection, String> {
    raw.parse::<Selection>().map_err(|e| e.to_string())
}

impl ComputeArgs {
    /// Usage problems clap cannot express on its own.
    pub fn validate(&self) -> Result<(), String> {
        if self.selections.len() > MAX_SELECTIONS {
            return Err(format!(
                "At most {MAX_SELECTIONS} selections are allowed (got {}).",
                self.selections.len()
            ));
        }
        Ok(())
    }
}
