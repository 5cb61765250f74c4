//! Shared compute pipeline.
//!
//! repository -> resolve/fetch -> weight/aggregate -> display window -> master table
//!
//! The CLI only prints and exports what this returns.

use std::path::PathBuf;

use tracing::info;

use crate::data::{Catalog, FileRepository, FredClient, FredRepository, SeriesRepository};
use crate::domain::{CompositeResult, ComputeConfig, SourceKind};
use crate::engine::{ComputeOptions, DisplayWindow, compute_composite};
use crate::error::AppError;
use crate::report::MasterTable;

const DEFAULT_CATALOG: &str = "catalog.csv";
const DEFAULT_OBSERVATIONS: &str = "observations.csv";

/// All computed outputs of a single `cpi compute` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub result: CompositeResult,
    pub window: Option<DisplayWindow>,
    pub table: MasterTable,
}

/// Build the configured repository and run the computation.
pub fn run_compute(config: &ComputeConfig) -> Result<RunOutput, AppError> {
    let repo = open_repository(config)?;
    run_compute_with(repo.as_ref(), config)
}

/// Run the computation against an already-built repository.
pub fn run_compute_with<R>(repo: &R, config: &ComputeConfig) -> Result<RunOutput, AppError>
where
    R: SeriesRepository + ?Sized,
{
    let options = ComputeOptions {
        policy: config.policy,
        parallel: config.parallel,
        rebase_year: config.rebase_year,
    };
    let result = compute_composite(repo, &config.selections, options)?;
    Ok(present(result, config.window_years))
}

/// Attach the display window and master table to a result.
pub fn present(result: CompositeResult, window_years: Option<u32>) -> RunOutput {
    let window = window_years.and_then(|years| DisplayWindow::trailing_years(&result.composite, years));
    let table = MasterTable::build(&result);
    RunOutput { result, window, table }
}

pub fn open_repository(config: &ComputeConfig) -> Result<Box<dyn SeriesRepository>, AppError> {
    match config.source {
        SourceKind::File => {
            let observations = config
                .observations_path
                .clone()
                .ok_or_else(|| AppError::new(2, "No observations CSV configured for `--source file`."))?;
            info!(
                catalog = %config.catalog_path.display(),
                observations = %observations.display(),
                "opening file repository"
            );
            Ok(Box::new(FileRepository::open(&config.catalog_path, &observations)?))
        }
        SourceKind::Fred => {
            info!(catalog = %config.catalog_path.display(), "opening FRED repository");
            let catalog = Catalog::from_path(&config.catalog_path)?;
            let client = FredClient::from_env()?;
            Ok(Box::new(FredRepository::new(catalog, client)))
        }
    }
}

/// Catalog path from the flag, then `$CPI_CATALOG`, then the default.
pub fn resolve_catalog_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("CPI_CATALOG").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG))
}

/// Observations path from the flag, then `$CPI_OBSERVATIONS`, then the default.
pub fn resolve_observations_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("CPI_OBSERVATIONS").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OBSERVATIONS))
}
