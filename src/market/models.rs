use serde::{Deserialize, Serialize};

/// One time-bucketed OHLCV record. Timestamps are unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A named candle interval with its aggregation weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeSpec {
    pub name: String,
    pub interval: String,
    pub limit: usize,
    pub weight: u32,
}

impl TimeframeSpec {
    pub fn new(name: &str, interval: &str, limit: usize, weight: u32) -> Self {
        Self {
            name: name.to_string(),
            interval: interval.to_string(),
            limit,
            weight,
        }
    }
}

/// Candle series as parallel arrays, the layout the indicator layer consumes.
/// Candles are expected to be in ascending timestamp order; `from_candles`
/// sorts to enforce this.
#[derive(Debug, Clone, Default)]
pub struct CandleData {
    pub symbol: String,
    pub interval: String,
    pub timestamp: Vec<i64>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
}

impl CandleData {
    pub fn new(symbol: String, interval: String) -> Self {
        Self {
            symbol,
            interval,
            ..Default::default()
        }
    }

    pub fn from_candles(symbol: String, interval: String, mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp);

        let mut data = Self::new(symbol, interval);
        data.timestamp.reserve(candles.len());
        for candle in candles {
            data.timestamp.push(candle.timestamp);
            data.open.push(candle.open);
            data.high.push(candle.high);
            data.low.push(candle.low);
            data.close.push(candle.close);
            data.volume.push(candle.volume);
        }
        data
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.close.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_candles_sorts_ascending() {
        let candles = vec![
            Candle { timestamp: 3000, open: 3.0, high: 3.5, low: 2.5, close: 3.2, volume: 30.0 },
            Candle { timestamp: 1000, open: 1.0, high: 1.5, low: 0.5, close: 1.2, volume: 10.0 },
            Candle { timestamp: 2000, open: 2.0, high: 2.5, low: 1.5, close: 2.2, volume: 20.0 },
        ];

        let data = CandleData::from_candles("BTC-USDT".into(), "5m".into(), candles);

        assert_eq!(data.timestamp, vec![1000, 2000, 3000]);
        assert_eq!(data.close, vec![1.2, 2.2, 3.2]);
        assert_eq!(data.last_close(), Some(3.2));
    }
}
