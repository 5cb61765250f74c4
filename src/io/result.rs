//! Read/write composite result JSON files.
//!
//! The JSON carries the composite, every constituent series (unweighted) and
//! the index-aligned labels, identifiers and weights. The schema is defined by
//! `domain::CompositeResult`.

use std::fs::File;
use std::path::Path;

use crate::domain::CompositeResult;
use crate::error::AppError;

pub fn write_result_json(path: &Path, result: &CompositeResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create result JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, result)
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;

    Ok(())
}

pub fn read_result_json(path: &Path) -> Result<CompositeResult, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open result JSON '{}': {e}", path.display())))?;
    let result: CompositeResult =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid result JSON: {e}")))?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{SeriesId, TimeSeries};

    #[test]
    fn written_file_reads_back() {
        let d = |m| NaiveDate::from_ymd_opt(2021, m, 1).unwrap();
        let result = CompositeResult {
            composite: TimeSeries::from_pairs(vec![(d(1), 14.0), (d(2), 16.0)]),
            individual: vec![TimeSeries::from_pairs(vec![(d(1), 10.0), (d(2), 12.0)])],
            labels: vec!["Steel".into()],
            series_ids: vec![SeriesId::from("WPU101")],
            weights: vec![60.0],
        };

        let path = std::env::temp_dir().join(format!("cpi-result-{}.json", std::process::id()));
        write_result_json(&path, &result).unwrap();
        let back = read_result_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back, result);
    }

    #[test]
    fn missing_file_is_a_usage_error() {
        let err = read_result_json(Path::new("/nonexistent/cpi.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
