//! FRED API integration for commodity price series.
//!
//! FRED hosts the BLS producer price indexes by commodity (`WPU*` series), so a
//! catalog CSV mapping categories to those identifiers is enough to build a
//! composite from live data.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::data::{Catalog, SeriesRepository};
use crate::domain::{CategoryPair, Observation, SeriesId, TimeSeries};
use crate::error::{AppError, RepositoryError};
use crate::io::ingest::parse_value;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const OBS_LIMIT: usize = 100000;

pub struct FredClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FredClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY")
            .map_err(|_| AppError::new(2, "Missing FRED_API_KEY in environment (.env)."))?;
        Ok(Self::new(api_key))
    }

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (mirrors, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch every observation for `series_id`.
    ///
    /// Connection failures are reported as [`RepositoryError::Unreachable`];
    /// a bad status or body only fails this one series.
    pub fn fetch_observations(&self, series_id: &str) -> Result<Vec<Observation>, RepositoryError> {
        let limit = OBS_LIMIT.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("limit", limit.as_str()),
            ])
            .send()
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    RepositoryError::Unreachable(format!("FRED request failed: {e}"))
                } else {
                    RepositoryError::Request(format!("FRED request for {series_id} failed: {e}"))
                }
            })?;

        if !resp.status().is_success() {
            return Err(RepositoryError::Request(format!(
                "FRED request for {series_id} failed with status {}.",
                resp.status()
            )));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| RepositoryError::Request(format!("Failed to parse FRED response for {series_id}: {e}")))?;

        let out = parse_observations(body.observations)?;
        debug!(series_id, n = out.len(), "fetched FRED observations");
        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}

fn parse_observations(raw: Vec<FredObservation>) -> Result<Vec<Observation>, RepositoryError> {
    let mut out = Vec::with_capacity(raw.len());
    for obs in raw {
        // FRED marks missing observations with ".".
        let Some(value) = parse_value(&obs.value) else {
            continue;
        };
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
            .map_err(|e| RepositoryError::Request(format!("Invalid FRED date '{}': {e}", obs.date)))?;
        out.push(Observation::new(date, value));
    }
    Ok(out)
}

/// Catalog-driven repository that fetches observations from FRED.
pub struct FredRepository {
    catalog: Catalog,
    client: FredClient,
}

impl FredRepository {
    pub fn new(catalog: Catalog, client: FredClient) -> Self {
        Self { catalog, client }
    }
}

impl SeriesRepository for FredRepository {
    fn list_categories(&self) -> Result<Vec<CategoryPair>, RepositoryError> {
        Ok(self.catalog.categories())
    }

    fn resolve_series(&self, category_2: &str, category_3: Option<&str>) -> Result<Vec<SeriesId>, RepositoryError> {
        Ok(self.catalog.resolve(category_2, category_3))
    }

    fn fetch_series(&self, series_id: &SeriesId) -> Result<TimeSeries, RepositoryError> {
        self.client
            .fetch_observations(series_id.as_str())
            .map(TimeSeries::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fred_payload_and_skips_missing() {
        let body: ObservationsResponse = serde_json::from_str(
            r#"{"observations":[
                {"realtime_start":"2024-01-01","date":"2021-01-01","value":"231.4"},
                {"realtime_start":"2024-01-01","date":"2021-02-01","value":"."},
                {"realtime_start":"2024-01-01","date":"2021-03-01","value":"240.0"}
            ]}"#,
        )
        .unwrap();
        let obs = parse_observations(body.observations).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[1].observation_date, NaiveDate::from_ymd_opt(2021, 3, 1).unwrap());
        assert!((obs[0].value - 231.4).abs() < 1e-12);
    }

    #[test]
    fn malformed_date_fails_only_the_request() {
        let raw = vec![FredObservation {
            date: "March 2021".to_string(),
            value: "1.0".to_string(),
        }];
        let err = parse_observations(raw).unwrap_err();
        assert!(!err.is_fatal());
    }
}
