//! Export the master table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one row per date, blank cells where a series has no observation.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::report::MasterTable;

/// Write the full master table (no display window) to a CSV file.
pub fn write_table_csv(path: &Path, table: &MasterTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_table(file, table)
}

pub fn write_table<W: Write>(writer: W, table: &MasterTable) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["observation_date".to_string(), "composite".to_string()];
    header.extend(table.labels.iter().cloned());
    wtr.write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(row.values.len() + 2);
        record.push(row.observation_date.to_string());
        record.push(fmt_cell(row.composite));
        record.extend(row.values.iter().map(|v| fmt_cell(*v)));
        wtr.write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

fn fmt_cell(v: Option<f64>) -> String {
    v.map(|x| format!("{x}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::report::MasterRow;

    #[test]
    fn writes_header_and_blank_gaps() {
        let table = MasterTable {
            labels: vec!["Steel".into(), "Crude, light".into()],
            rows: vec![
                MasterRow {
                    observation_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                    composite: Some(14.0),
                    values: vec![Some(10.0), Some(20.0)],
                },
                MasterRow {
                    observation_date: NaiveDate::from_ymd_opt(2021, 2, 1).unwrap(),
                    composite: Some(4.8),
                    values: vec![Some(8.0), None],
                },
            ],
        };

        let mut buf = Vec::new();
        write_table(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "observation_date,composite,Steel,\"Crude, light\"\n\
             2021-01-01,14,10,20\n\
             2021-02-01,4.8,8,\n"
        );
    }
}
