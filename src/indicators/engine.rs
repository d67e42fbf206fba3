use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::IndicatorSettings;
use crate::indicators::ta::{
    self, BollingerValue, MacdValue, StochasticValue,
};
use crate::market::CandleData;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaCrossValue {
    pub fast: f64,
    pub slow: f64,
}

/// Latest value of every configured indicator for one timeframe. A None
/// field means the series was too short for that indicator's lookback.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub macd: Option<MacdValue>,
    pub bollinger: Option<BollingerValue>,
    pub stochastic: Option<StochasticValue>,
    pub obv: Option<f64>,
    pub adx: Option<f64>,
    pub ma_cross: Option<MaCrossValue>,
    /// Latest simple moving average per configured period, keyed by period.
    pub moving_averages: BTreeMap<usize, f64>,
}

/// Compute the full snapshot for one candle series.
pub fn compute_snapshot(data: &CandleData, params: &IndicatorSettings) -> IndicatorSnapshot {
    let close = &data.close;

    let ma_cross = match (
        ta::sma_last(close, params.ma_fast),
        ta::sma_last(close, params.ma_slow),
    ) {
        (Some(fast), Some(slow)) => Some(MaCrossValue { fast, slow }),
        _ => None,
    };

    let mut moving_averages = BTreeMap::new();
    for &period in params
        .ma_short
        .iter()
        .chain(params.ma_medium.iter())
        .chain(params.ma_long.iter())
    {
        if let Some(value) = ta::sma_last(close, period) {
            moving_averages.insert(period, value);
        }
    }

    IndicatorSnapshot {
        rsi: ta::rsi_last(close, params.rsi_period),
        macd: ta::macd_last(close, params.macd_fast, params.macd_slow, params.macd_signal),
        bollinger: ta::bollinger_last(close, params.bb_period, params.bb_std_dev),
        stochastic: ta::stochastic_last(
            &data.high,
            &data.low,
            close,
            params.stoch_period,
            params.stoch_signal,
        ),
        obv: ta::obv_last(close, &data.volume),
        adx: ta::adx_last(&data.high, &data.low, close, params.adx_period),
        ma_cross,
        moving_averages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::Candle;

    fn rising_data(n: usize) -> CandleData {
        let candles: Vec<Candle> = (0..n)
            .map(|i| {
                let close = 100.0 + i as f64;
                Candle {
                    timestamp: i as i64,
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1000.0,
                }
            })
            .collect();
        CandleData::from_candles("BTC-USDT".into(), "1D".into(), candles)
    }

    #[test]
    fn full_series_populates_every_field() {
        let snapshot = compute_snapshot(&rising_data(200), &IndicatorSettings::default());
        assert!(snapshot.rsi.is_some());
        assert!(snapshot.macd.is_some());
        assert!(snapshot.bollinger.is_some());
        assert!(snapshot.stochastic.is_some());
        assert!(snapshot.obv.is_some());
        assert!(snapshot.adx.is_some());
        let cross = snapshot.ma_cross.unwrap();
        assert!(cross.fast > cross.slow);
        // 10, 20, 50, 100, 120, 200
        assert_eq!(snapshot.moving_averages.len(), 6);
    }

    #[test]
    fn short_series_leaves_long_lookbacks_unset() {
        let snapshot = compute_snapshot(&rising_data(30), &IndicatorSettings::default());
        assert!(snapshot.rsi.is_some());
        assert!(snapshot.macd.is_none());
        assert!(snapshot.ma_cross.is_none());
        assert!(!snapshot.moving_averages.contains_key(&200));
        assert!(snapshot.moving_averages.contains_key(&10));
    }
}
