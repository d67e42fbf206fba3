//! Ichimoku cloud analysis: the five lines plus the discrete signals the
//! trend scorer consumes.

use serde::{Deserialize, Serialize};

const CONVERSION_PERIOD: usize = 9;
const BASE_PERIOD: usize = 26;
const SPAN_B_PERIOD: usize = 52;
const LAGGING_OFFSET: usize = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IchimokuSignal {
    ConversionAboveBase,
    ConversionBelowBase,
    PriceAboveCloud,
    PriceBelowCloud,
    LaggingAbovePrice,
    LaggingBelowPrice,
    CloudBullish,
    CloudBearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IchimokuTrend {
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
    StrongBearish,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IchimokuAnalysis {
    pub conversion: f64,
    pub base: f64,
    pub span_a: f64,
    pub span_b: f64,
    pub lagging: f64,
    pub signals: Vec<IchimokuSignal>,
    pub trend: IchimokuTrend,
}

fn midpoint(high: &[f64], low: &[f64], period: usize) -> f64 {
    let h = high[high.len() - period..]
        .iter()
        .cloned()
        .fold(f64::MIN, f64::max);
    let l = low[low.len() - period..]
        .iter()
        .cloned()
        .fold(f64::MAX, f64::min);
    (h + l) / 2.0
}

/// Full Ichimoku computation. None when fewer than 52 candles are available,
/// the span-B lookback.
pub fn analyze_ichimoku(high: &[f64], low: &[f64], close: &[f64]) -> Option<IchimokuAnalysis> {
    let n = close.len().min(high.len()).min(low.len());
    if n < SPAN_B_PERIOD {
        return None;
    }

    let conversion = midpoint(high, low, CONVERSION_PERIOD);
    let base = midpoint(high, low, BASE_PERIOD);
    let span_a = (conversion + base) / 2.0;
    let span_b = midpoint(high, low, SPAN_B_PERIOD);
    let lagging = close[close.len() - LAGGING_OFFSET];
    let price = close[close.len() - 1];

    let mut signals = Vec::new();
    if conversion > base {
        signals.push(IchimokuSignal::ConversionAboveBase);
    } else if conversion < base {
        signals.push(IchimokuSignal::ConversionBelowBase);
    }
    if price > span_a && price > span_b {
        signals.push(IchimokuSignal::PriceAboveCloud);
    } else if price < span_a && price < span_b {
        signals.push(IchimokuSignal::PriceBelowCloud);
    }
    if lagging > price {
        signals.push(IchimokuSignal::LaggingAbovePrice);
    } else if lagging < price {
        signals.push(IchimokuSignal::LaggingBelowPrice);
    }
    if span_a > span_b {
        signals.push(IchimokuSignal::CloudBullish);
    } else if span_a < span_b {
        signals.push(IchimokuSignal::CloudBearish);
    }

    let strong_bullish = price > conversion && price > base && price > span_a && price > span_b;
    let strong_bearish = price < conversion && price < base && price < span_a && price < span_b;

    let trend = determine_trend(&signals, strong_bullish, strong_bearish);

    Some(IchimokuAnalysis {
        conversion,
        base,
        span_a,
        span_b,
        lagging,
        signals,
        trend,
    })
}

// Cloud color is deliberately left out of the bull/bear tally; only line
// crosses and positional signals count.
fn determine_trend(
    signals: &[IchimokuSignal],
    strong_bullish: bool,
    strong_bearish: bool,
) -> IchimokuTrend {
    if strong_bullish {
        return IchimokuTrend::StrongBullish;
    }
    if strong_bearish {
        return IchimokuTrend::StrongBearish;
    }

    let bullish = signals
        .iter()
        .filter(|s| {
            matches!(
                s,
                IchimokuSignal::ConversionAboveBase
                    | IchimokuSignal::PriceAboveCloud
                    | IchimokuSignal::LaggingAbovePrice
            )
        })
        .count();
    let bearish = signals
        .iter()
        .filter(|s| {
            matches!(
                s,
                IchimokuSignal::ConversionBelowBase
                    | IchimokuSignal::PriceBelowCloud
                    | IchimokuSignal::LaggingBelowPrice
            )
        })
        .count();

    if bullish > bearish {
        IchimokuTrend::Bullish
    } else if bearish > bullish {
        IchimokuTrend::Bearish
    } else {
        IchimokuTrend::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let close: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        let high: Vec<f64> = close.iter().map(|c| c + 1.0).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 1.0).collect();
        (high, low, close)
    }

    #[test]
    fn undefined_below_span_b_lookback() {
        let (high, low, close) = rising(51);
        assert!(analyze_ichimoku(&high, &low, &close).is_none());
    }

    #[test]
    fn rising_market_is_strong_bullish() {
        let (high, low, close) = rising(200);
        let analysis = analyze_ichimoku(&high, &low, &close).unwrap();

        assert!(analysis.conversion > analysis.base);
        assert!(analysis.signals.contains(&IchimokuSignal::ConversionAboveBase));
        assert!(analysis.signals.contains(&IchimokuSignal::PriceAboveCloud));
        // The lagging span trails a rising price.
        assert!(analysis.signals.contains(&IchimokuSignal::LaggingBelowPrice));
        assert_eq!(analysis.trend, IchimokuTrend::StrongBullish);
    }

    #[test]
    fn flat_market_is_neutral_with_no_signals() {
        let flat = vec![100.0; 60];
        let analysis = analyze_ichimoku(&flat, &flat, &flat).unwrap();

        assert!(analysis.signals.is_empty());
        assert_eq!(analysis.trend, IchimokuTrend::Neutral);
        assert_eq!(analysis.span_a, 100.0);
        assert_eq!(analysis.span_b, 100.0);
    }

    #[test]
    fn falling_market_is_strong_bearish() {
        let close: Vec<f64> = (0..200).map(|i| 500.0 - i as f64).collect();
        let high: Vec<f64> = close.iter().map(|c| c + 1.0).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 1.0).collect();
        let analysis = analyze_ichimoku(&high, &low, &close).unwrap();

        assert!(analysis.signals.contains(&IchimokuSignal::PriceBelowCloud));
        assert_eq!(analysis.trend, IchimokuTrend::StrongBearish);
    }
}
