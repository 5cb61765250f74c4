//! Formatted terminal output.
//!
//! Formatting lives here so the engine stays free of presentation concerns
//! and output changes stay localized.

use crate::domain::{CategoryPair, CompositeResult, ComputeConfig, TimeSeries};
use crate::engine::DisplayWindow;
use crate::report::MasterTable;

const DATE_WIDTH: usize = 12;
const VALUE_WIDTH: usize = 12;

/// Format the catalog, grouped by `category_2`.
pub fn format_categories(categories: &[CategoryPair]) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;
    for pair in categories {
        if current != Some(pair.category_2.as_str()) {
            out.push_str(&pair.category_2);
            out.push('\n');
            current = Some(pair.category_2.as_str());
        }
        out.push_str(&format!("  - {}\n", pair.category_3));
    }
    if categories.is_empty() {
        out.push_str("(catalog is empty)\n");
    }
    out
}

/// Format the run summary: selections, constituents, composite range.
pub fn format_summary(result: &CompositeResult, config: &ComputeConfig, window: Option<&DisplayWindow>) -> String {
    let mut out = String::new();

    out.push_str("=== cpi - Composite Commodity Index ===\n");
    out.push_str(&format!(
        "Selections: {} | policy={:?} | source={:?}\n",
        config.selections.len(),
        config.policy,
        config.source
    ));
    let total = config.selections.total_weight();
    if config.selections.is_balanced() {
        out.push_str(&format!("Weights: {total:.2}%\n"));
    } else {
        out.push_str(&format!("Weights: {total:.2}% (note: weights should add up to 100%)\n"));
    }
    if let Some(year) = config.rebase_year {
        out.push_str(&format!("Rebased: mean({year}) = 100\n"));
    }

    out.push_str("\nConstituents:\n");
    if result.is_empty() {
        out.push_str("  (no selection resolved to a series)\n");
    } else {
        out.push_str(
            format!(
                "{:<24} {:<14} {:>8} {:>6} {:>12} {:>12} {:>12}\n",
                "label", "series_id", "weight", "n", "first", "last", "last_value"
            )
            .trim_end(),
        );
        out.push('\n');
        for i in 0..result.len() {
            let series = &result.individual[i];
            out.push_str(
                format!(
                    "{:<24} {:<14} {:>7.2}% {:>6} {:>12} {:>12} {:>12}\n",
                    truncate(&result.labels[i], 24),
                    truncate(result.series_ids[i].as_str(), 14),
                    result.weights[i],
                    series.len(),
                    fmt_date(series.first_date()),
                    fmt_date(series.last_date()),
                    fmt_opt(series.last_value()),
                )
                .trim_end(),
            );
            out.push('\n');
        }
    }

    out.push_str("\nComposite:\n");
    out.push_str(&format_composite_line(&result.composite));
    match window {
        Some(w) => out.push_str(&format!("Display window: from {}\n", w.start())),
        None if !result.composite.is_empty() => out.push_str("Display window: full history\n"),
        None => {}
    }

    out
}

fn format_composite_line(composite: &TimeSeries) -> String {
    match (composite.first_date(), composite.last_date(), composite.last_value()) {
        (Some(first), Some(last), Some(value)) => format!(
            "  rows={} | {first} .. {last} | latest={value:.4}\n",
            composite.len()
        ),
        _ => "  (nothing to show)\n".to_string(),
    }
}

/// Format the most recent `max_rows` rows of the master table inside `window`.
pub fn format_table(table: &MasterTable, window: Option<&DisplayWindow>, max_rows: usize) -> String {
    let mut out = String::new();
    let rows = table.rows_in(window);
    if rows.is_empty() {
        return out;
    }
    let skip = rows.len().saturating_sub(max_rows);

    let mut header = format!("{:<DATE_WIDTH$} {:>VALUE_WIDTH$}", "date", "composite");
    let mut rule = format!("{:-<DATE_WIDTH$} {:-<VALUE_WIDTH$}", "", "");
    for label in &table.labels {
        header.push_str(&format!(" {:>VALUE_WIDTH$}", truncate(label, VALUE_WIDTH)));
        rule.push_str(&format!(" {:-<VALUE_WIDTH$}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for row in &rows[skip..] {
        let mut line = format!(
            "{:<DATE_WIDTH$} {:>VALUE_WIDTH$}",
            row.observation_date.to_string(),
            fmt_opt(row.composite)
        );
        for value in &row.values {
            line.push_str(&format!(" {:>VALUE_WIDTH$}", fmt_opt(*value)));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if skip > 0 {
        out.push_str(&format!("({skip} earlier rows not shown)\n"));
    }
    out
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.4}")).unwrap_or_default()
}

fn fmt_date(d: Option<chrono::NaiveDate>) -> String {
    d.map(|x| x.to_string()).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{SeriesId, TimeSeries};

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn categories_are_grouped() {
        let text = format_categories(&[
            CategoryPair::new("Energy", "Oil"),
            CategoryPair::new("Metals", "Aluminum"),
            CategoryPair::new("Metals", "Steel"),
        ]);
        assert_eq!(text, "Energy\n  - Oil\nMetals\n  - Aluminum\n  - Steel\n");
    }

    #[test]
    fn table_shows_latest_rows_with_blanks_for_gaps() {
        let result = CompositeResult {
            composite: TimeSeries::from_pairs(vec![(d(2021, 1), 14.0), (d(2021, 2), 16.0), (d(2021, 3), 8.8)]),
            individual: vec![
                TimeSeries::from_pairs(vec![(d(2021, 1), 10.0), (d(2021, 2), 12.0)]),
                TimeSeries::from_pairs(vec![(d(2021, 1), 20.0), (d(2021, 2), 22.0), (d(2021, 3), 22.0)]),
            ],
            labels: vec!["Steel".into(), "Oil".into()],
            series_ids: vec![SeriesId::from("s"), SeriesId::from("o")],
            weights: vec![60.0, 40.0],
        };
        let table = MasterTable::build(&result);
        let text = format_table(&table, None, 2);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("date"));
        assert!(lines[0].ends_with("Oil"));
        assert!(lines[2].starts_with("2021-02-01"));
        assert!(lines[3].starts_with("2021-03-01"));
        assert!(lines[3].ends_with("22.0000"));
        assert_eq!(lines[4], "(1 earlier rows not shown)");
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Aluminum", 10), "Aluminum");
        assert_eq!(truncate("Aluminum mill shapes", 10), "Aluminum .");
    }
}
