use crate::http_client;
use async_trait::async_trait;
use chrono::NaiveDate;
use dipwatch_core::market::entity::VolatilitySnapshot;
use dipwatch_core::market::error::MarketError;
use dipwatch_core::market::port::VolatilityProvider;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org";
const SERIES_ID: &str = "VIXCLS";
// About one trading week of observations
const OBSERVATION_LIMIT: usize = 7;

/// # Summary
/// CBOE volatility index readings from the FRED `VIXCLS` series.
///
/// # Invariants
/// - FRED marks holidays with the value `"."`; such observations are ignored.
#[derive(Clone)]
pub struct FredVixProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FredVixProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self, MarketError> {
        Ok(Self {
            client: http_client()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Points the provider at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Deserialize, Debug)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Deserialize, Debug)]
struct Observation {
    date: NaiveDate,
    value: String,
}

/// # Summary
/// Folds observations (newest first) into a snapshot.
///
/// # Logic
/// The newest valid value is the reading; `change` is newest minus oldest valid
/// value and is only set when at least two observations were valid.
fn snapshot(observations: &[Observation]) -> Option<VolatilitySnapshot> {
    let valid: Vec<(NaiveDate, Decimal)> = observations
        .iter()
        .filter_map(|o| o.value.trim().parse::<Decimal>().ok().map(|v| (o.date, v)))
        .collect();

    let &(as_of, value) = valid.first()?;
    let change = match valid.last() {
        Some(&(_, oldest)) if valid.len() > 1 => Some(value - oldest),
        _ => None,
    };

    Some(VolatilitySnapshot {
        value,
        as_of,
        change,
    })
}

#[async_trait]
impl VolatilityProvider for FredVixProvider {
    async fn latest_volatility(&self) -> Result<Option<VolatilitySnapshot>, MarketError> {
        let url = format!("{}/fred/series/observations", self.base_url);
        let limit = OBSERVATION_LIMIT.to_string();
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("series_id", SERIES_ID),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("sort_order", "desc"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| MarketError::Network(e.without_url().to_string()))?;

        let status = resp.status();
        if status.is_client_error() {
            // FRED answers a bad key or series with 400
            return Err(MarketError::Upstream(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(MarketError::Network(format!("HTTP {}", status)));
        }

        let body: ObservationsResponse = resp
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.without_url().to_string()))?;

        let snap = snapshot(&body.observations);
        debug!(
            observations = body.observations.len(),
            found = snap.is_some(),
            "Fetched volatility observations"
        );
        Ok(snap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn obs(date: &str, value: &str) -> Observation {
        Observation {
            date: date.parse().unwrap(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_snapshot_skips_missing_values() {
        let snap = snapshot(&[
            obs("2024-08-06", "."),
            obs("2024-08-05", "38.57"),
            obs("2024-08-02", "23.39"),
            obs("2024-08-01", "."),
        ])
        .unwrap();
        assert_eq!(snap.as_of, NaiveDate::from_ymd_opt(2024, 8, 5).unwrap());
        assert_eq!(snap.value, dec!(38.57));
        assert_eq!(snap.change, Some(dec!(15.18)));
    }

    #[test]
    fn test_single_observation_has_no_change() {
        let snap = snapshot(&[obs("2024-08-05", "16.20")]).unwrap();
        assert_eq!(snap.change, None);
    }

    #[test]
    fn test_no_valid_observation() {
        assert!(snapshot(&[obs("2024-08-05", ".")]).is_none());
        assert!(snapshot(&[]).is_none());
    }
}
