use crate::market::models::{Candle, CandleData, TimeframeSpec};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Malformed(String),
}

/// Seam between the analysis pipeline and whatever supplies candle history.
#[async_trait]
pub trait CandleFetcher: Send + Sync {
    async fn fetch(&self, spec: &TimeframeSpec) -> Result<CandleData, FetchError>;
}

#[derive(Debug, Deserialize)]
struct OkxCandleResponse {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<Vec<String>>,
}

/// OKX v5 market-data client.
pub struct OkxClient {
    base_url: String,
    symbol: String,
    client: reqwest::Client,
}

impl OkxClient {
    pub fn new(base_url: &str, symbol: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            symbol: symbol.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CandleFetcher for OkxClient {
    async fn fetch(&self, spec: &TimeframeSpec) -> Result<CandleData, FetchError> {
        let url = format!(
            "{}/market/candles?instId={}&bar={}&limit={}",
            self.base_url, self.symbol, spec.interval, spec.limit
        );
        debug!("requesting {} {} candles", self.symbol, spec.name);

        let response: OkxCandleResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.code != "0" {
            return Err(FetchError::Malformed(format!(
                "OKX error code {}: {}",
                response.code, response.msg
            )));
        }

        let candles = response
            .data
            .iter()
            .map(|row| parse_candle_row(row))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "received {} {} candles for {}",
            candles.len(),
            spec.name,
            self.symbol
        );

        // OKX returns candles newest-first; from_candles sorts ascending.
        Ok(CandleData::from_candles(
            self.symbol.clone(),
            spec.interval.clone(),
            candles,
        ))
    }
}

// OKX candle rows are [ts, open, high, low, close, vol, ...] as strings.
fn parse_candle_row(row: &[String]) -> Result<Candle, FetchError> {
    if row.len() < 6 {
        return Err(FetchError::Malformed(format!(
            "candle row has {} fields, expected at least 6",
            row.len()
        )));
    }

    let field = |i: usize| -> Result<f64, FetchError> {
        row[i]
            .parse::<f64>()
            .map_err(|_| FetchError::Malformed(format!("non-numeric candle field: {}", row[i])))
    };

    Ok(Candle {
        timestamp: row[0]
            .parse::<i64>()
            .map_err(|_| FetchError::Malformed(format!("bad timestamp: {}", row[0])))?,
        open: field(1)?,
        high: field(2)?,
        low: field(3)?,
        close: field(4)?,
        volume: field(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_candle_row() {
        let row: Vec<String> = vec!["1700000000000", "100.5", "101", "99.5", "100.8", "42.7"]
            .into_iter()
            .map(String::from)
            .collect();

        let candle = parse_candle_row(&row).unwrap();
        assert_eq!(candle.timestamp, 1_700_000_000_000);
        assert_eq!(candle.high, 101.0);
        assert_eq!(candle.volume, 42.7);
    }

    #[test]
    fn rejects_short_row() {
        let row: Vec<String> = vec!["1700000000000", "100.5"]
            .into_iter()
            .map(String::from)
            .collect();
        assert!(parse_candle_row(&row).is_err());
    }
}
