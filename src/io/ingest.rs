//! CSV ingest for the catalog and local observation files.
//!
//! Both files are read the same way:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - header names are case-insensitive and tolerate a UTF-8 BOM

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{CategoryPair, Observation, SeriesId};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Parsed rows plus whatever was skipped along the way.
#[derive(Debug, Clone)]
pub struct Ingested<T> {
    pub rows: Vec<T>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// One `(category_2, category_3) -> series_id` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub pair: CategoryPair,
    pub series_id: SeriesId,
}

/// One dated value for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    pub series_id: SeriesId,
    pub observation: Observation,
}

pub fn open_csv(path: &Path, what: &str) -> Result<File, AppError> {
    File::open(path).map_err(|e| AppError::new(2, format!("Failed to open {what} '{}': {e}", path.display())))
}

/// Read catalog rows (`category_2,category_3,series_id`).
pub fn read_catalog<R: Read>(reader: R) -> Result<Ingested<CatalogRow>, AppError> {
    read_rows(reader, &["category_2", "category_3", "series_id"], |record, headers| {
        let category_2 = get_required(record, headers, "category_2")?;
        let category_3 = get_required(record, headers, "category_3")?;
        let series_id = get_required(record, headers, "series_id")?;
        Ok(Some(CatalogRow {
            pair: CategoryPair::new(category_2, category_3),
            series_id: SeriesId::new(series_id),
        }))
    })
}

/// Read observation rows (`series_id,observation_date,value`).
///
/// Missing values (`.` or empty) are skipped without being reported.
pub fn read_observations<R: Read>(reader: R) -> Result<Ingested<ObservationRow>, AppError> {
    read_rows(reader, &["series_id", "observation_date", "value"], |record, headers| {
        let series_id = get_required(record, headers, "series_id")?;
        let date = parse_date(get_required(record, headers, "observation_date")?)?;
        let Some(raw) = get_optional(record, headers, "value") else {
            return Ok(None);
        };
        let Some(value) = parse_value(raw) else {
            if raw == "." {
                return Ok(None);
            }
            return Err(format!("Invalid value '{raw}'."));
        };
        Ok(Some(ObservationRow {
            series_id: SeriesId::new(series_id),
            observation: Observation::new(date, value),
        }))
    })
}

fn read_rows<R, T, F>(reader: R, required: &[&str], mut parse: F) -> Result<Ingested<T>, AppError>
where
    R: Read,
    F: FnMut(&StringRecord, &HashMap<String, usize>) -> Result<Option<T>, String>,
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for name in required {
        if !header_map.contains_key(*name) {
            return Err(AppError::new(2, format!("Missing required column: `{name}`")));
        }
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Line 1 is the header.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse(&record, &header_map) {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => {}
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    Ok(Ingested {
        rows,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse an observation date.
///
/// ISO dates are preferred; a few common export formats are accepted too.
/// Month-only dates (`YYYY-MM`) map to the first of the month.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Ok(d);
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD, YYYY-MM."
    ))
}

/// Parse a numeric value; `.` and blanks are missing, non-finite values are rejected.
pub fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_rows_are_read_in_file_order() {
        let csv = "\u{feff}Category_2,Category_3,Series_ID\n\
                   Metals,Steel,WPU101\n\
                   Metals,,WPU102\n\
                   Energy,Oil,WPU0561\n";
        let ingested = read_catalog(csv.as_bytes()).unwrap();
        assert_eq!(ingested.rows_read, 3);
        assert_eq!(ingested.rows.len(), 2);
        assert_eq!(ingested.rows[0].series_id.as_str(), "WPU101");
        assert_eq!(ingested.rows[1].pair, CategoryPair::new("Energy", "Oil"));
        assert_eq!(ingested.row_errors.len(), 1);
        assert_eq!(ingested.row_errors[0].line, 3);
    }

    #[test]
    fn catalog_requires_series_id_column() {
        let err = read_catalog("category_2,category_3\nMetals,Steel\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("series_id"));
    }

    #[test]
    fn observations_skip_missing_values_and_report_bad_ones() {
        let csv = "series_id,observation_date,value\n\
                   WPU101,2021-01-01,10.5\n\
                   WPU101,2021-02,.\n\
                   WPU101,2021-03-01,abc\n\
                   WPU101,not-a-date,1\n\
                   WPU101,01/04/2021,12\n";
        let ingested = read_observations(csv.as_bytes()).unwrap();
        assert_eq!(ingested.rows.len(), 2);
        assert_eq!(
            ingested.rows[1].observation.observation_date,
            NaiveDate::from_ymd_opt(2021, 4, 1).unwrap()
        );
        assert_eq!(ingested.row_errors.len(), 2);
    }

    #[test]
    fn month_only_dates_map_to_first_of_month() {
        assert_eq!(parse_date("2020-02"), Ok(NaiveDate::from_ymd_opt(2020, 2, 1).unwrap()));
    }
}
