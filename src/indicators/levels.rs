//! Horizontal levels over the trailing window: pivot-based support and
//! resistance with break detection, and fibonacci retracement brackets.

use serde::{Deserialize, Serialize};

use crate::indicators::pivots::{find_extreme_points, PivotKind};

const WINDOW: usize = 20;
const BREAK_MARGIN: f64 = 0.02;
const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SupportResistance {
    pub current_price: f64,
    /// Up to three pivot lows, ascending.
    pub support_levels: Vec<f64>,
    /// Up to three pivot highs, descending.
    pub resistance_levels: Vec<f64>,
    pub nearest_support: Option<f64>,
    pub nearest_resistance: Option<f64>,
    /// Percent distance from the current price to each nearest level.
    pub distance_to_support: Option<f64>,
    pub distance_to_resistance: Option<f64>,
    pub support_break: bool,
    pub resistance_break: bool,
}

/// Find support and resistance from the trailing window's pivots and flag
/// closes more than 2% beyond the nearest level.
pub fn analyze_support_resistance(high: &[f64], low: &[f64], close: &[f64]) -> SupportResistance {
    let high = trailing(high);
    let low = trailing(low);
    let close = trailing(close);

    let mut result = SupportResistance {
        current_price: close.last().copied().unwrap_or(0.0),
        ..Default::default()
    };
    if close.is_empty() {
        return result;
    }

    let points = find_extreme_points(high, low);
    let mut resistance: Vec<f64> = points
        .iter()
        .filter(|p| p.kind == PivotKind::High)
        .map(|p| p.price)
        .collect();
    let mut support: Vec<f64> = points
        .iter()
        .filter(|p| p.kind == PivotKind::Low)
        .map(|p| p.price)
        .collect();

    resistance.sort_by(|a, b| b.total_cmp(a));
    resistance.truncate(3);
    support.sort_by(|a, b| a.total_cmp(b));
    support.truncate(3);

    let price = result.current_price;
    if let Some(&nearest) = support.first() {
        result.nearest_support = Some(nearest);
        result.distance_to_support = Some((price - nearest) / nearest * 100.0);
        result.support_break = price < nearest * (1.0 - BREAK_MARGIN);
    }
    if let Some(&nearest) = resistance.first() {
        result.nearest_resistance = Some(nearest);
        result.distance_to_resistance = Some((nearest - price) / price * 100.0);
        result.resistance_break = price > nearest * (1.0 + BREAK_MARGIN);
    }

    result.support_levels = support;
    result.resistance_levels = resistance;
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibLevel {
    pub ratio: f64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciAnalysis {
    pub levels: Vec<FibLevel>,
    pub range: f64,
    pub current: FibLevel,
    pub prev: Option<FibLevel>,
    pub next: Option<FibLevel>,
}

/// Bracket the latest close between retracement levels spanning the
/// trailing window's low-high range. None only for an empty series.
pub fn analyze_fibonacci(high: &[f64], low: &[f64], close: &[f64]) -> Option<FibonacciAnalysis> {
    let high = trailing(high);
    let low = trailing(low);
    let price = *close.last()?;

    let max_high = high.iter().cloned().fold(f64::MIN, f64::max);
    let min_low = low.iter().cloned().fold(f64::MAX, f64::min);
    let range = max_high - min_low;

    let levels: Vec<FibLevel> = FIB_RATIOS
        .iter()
        .map(|&ratio| FibLevel {
            ratio,
            price: min_low + range * ratio,
        })
        .collect();

    let (current, prev, next) = if price <= min_low {
        (levels[0], None, Some(levels[1]))
    } else if price >= max_high {
        (levels[6], Some(levels[5]), None)
    } else {
        let mut bracket = None;
        for i in 0..levels.len() - 1 {
            if levels[i].price <= price && price < levels[i + 1].price {
                let prev = if i > 0 { Some(levels[i - 1]) } else { None };
                bracket = Some((levels[i], prev, Some(levels[i + 1])));
                break;
            }
        }
        bracket?
    };

    Some(FibonacciAnalysis {
        levels,
        range,
        current,
        prev,
        next,
    })
}

fn trailing(values: &[f64]) -> &[f64] {
    &values[values.len().saturating_sub(WINDOW)..]
}
