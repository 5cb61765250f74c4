//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads `.env`
//! - builds the repository and runs the compute pipeline
//! - prints reports
//! - writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{CategoriesArgs, Command, ComputeArgs, ShowArgs};
use crate::data::Catalog;
use crate::domain::{ComputeConfig, SelectionSet, SourceKind};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `cpi` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    crate::logging::init_logging(cli.verbose);

    match cli.command {
        Command::Categories(args) => handle_categories(args),
        Command::Compute(args) => handle_compute(args),
        Command::Show(args) => handle_show(args),
    }
}

fn handle_categories(args: CategoriesArgs) -> Result<(), AppError> {
    let path = pipeline::resolve_catalog_path(args.catalog.catalog);
    let catalog = Catalog::from_path(&path)?;

    match args.category_2 {
        Some(category_2) => {
            let subcategories = catalog.subcategories(&category_2);
            if subcategories.is_empty() {
                return Err(AppError::new(2, format!("Unknown category_2 '{category_2}'.")));
            }
            for c3 in subcategories {
                println!("{c3}");
            }
        }
        None => print!("{}", crate::report::format_categories(&catalog.categories())),
    }
    Ok(())
}

fn handle_compute(args: ComputeArgs) -> Result<(), AppError> {
    args.validate().map_err(|msg| AppError::new(2, msg))?;
    let config = compute_config_from_args(&args)?;
    let run = pipeline::run_compute(&config)?;

    print!(
        "{}",
        crate::report::format_summary(&run.result, &config, run.window.as_ref())
    );
    let table = crate::report::format_table(&run.table, run.window.as_ref(), config.table_rows);
    if !table.is_empty() {
        println!();
        print!("{table}");
    }

    if let Some(path) = &config.export_table {
        crate::io::export::write_table_csv(path, &run.table)?;
        info!(path = %path.display(), "wrote table CSV");
    }
    if let Some(path) = &config.export_json {
        crate::io::result::write_result_json(path, &run.result)?;
        info!(path = %path.display(), "wrote result JSON");
    }

    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let result = crate::io::result::read_result_json(&args.result)?;
    let window_years = (!args.all_history).then_some(args.years);
    let run = pipeline::present(result, window_years);

    if run.result.composite.is_empty() {
        println!("Composite is empty: nothing to show.");
        return Ok(());
    }
    print!(
        "{}",
        crate::report::format_table(&run.table, run.window.as_ref(), args.rows)
    );
    Ok(())
}

pub fn compute_config_from_args(args: &ComputeArgs) -> Result<ComputeConfig, AppError> {
    let observations_path = match args.source {
        SourceKind::File => Some(pipeline::resolve_observations_path(args.observations.clone())),
        SourceKind::Fred => None,
    };

    Ok(ComputeConfig {
        selections: SelectionSet::new(args.selections.clone())?,
        policy: args.policy,
        parallel: args.parallel,
        rebase_year: args.rebase_year,
        window_years: (!args.all_history).then_some(args.years),
        source: args.source,
        catalog_path: pipeline::resolve_catalog_path(args.catalog.catalog.clone()),
        observations_path,
        table_rows: args.rows,
        export_table: args.export.clone(),
        export_json: args.export_json.clone(),
    })
}
