//! Harmonic pattern detection over the trailing candle window. The five
//! classic XABCD patterns are matched by comparing leg retracement ratios
//! against their textbook values within a fixed tolerance.

use serde::{Deserialize, Serialize};

use crate::indicators::pivots::find_extreme_points;

const WINDOW: usize = 20;
const TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmonicPattern {
    Gartley,
    Butterfly,
    Bat,
    Crab,
    Shark,
}

impl HarmonicPattern {
    pub const ALL: [HarmonicPattern; 5] = [
        HarmonicPattern::Gartley,
        HarmonicPattern::Butterfly,
        HarmonicPattern::Bat,
        HarmonicPattern::Crab,
        HarmonicPattern::Shark,
    ];

    /// Target ratios for the AB, BC, CD and XA legs.
    fn leg_ratios(self) -> [f64; 4] {
        match self {
            HarmonicPattern::Gartley => [0.618, 0.382, 0.786, 0.786],
            HarmonicPattern::Butterfly => [0.786, 0.382, 1.618, 0.786],
            HarmonicPattern::Bat => [0.382, 0.382, 0.886, 0.886],
            HarmonicPattern::Crab => [0.382, 0.382, 1.618, 1.618],
            HarmonicPattern::Shark => [1.13, 1.618, 1.27, 1.618],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HarmonicPattern::Gartley => "Gartley",
            HarmonicPattern::Butterfly => "Butterfly",
            HarmonicPattern::Bat => "Bat",
            HarmonicPattern::Crab => "Crab",
            HarmonicPattern::Shark => "Shark",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternDirection {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarmonicHit {
    pub pattern: HarmonicPattern,
    pub direction: PatternDirection,
}

/// Every harmonic pattern matched by the first five pivots of the trailing
/// window. Empty when fewer than five pivots exist or no ratios line up.
pub fn analyze_harmonic(high: &[f64], low: &[f64]) -> Vec<HarmonicHit> {
    let high = trailing(high);
    let low = trailing(low);

    let points = find_extreme_points(high, low);
    if points.len() < 5 {
        return Vec::new();
    }

    // X, A, B, C, D are the first five pivots in chronological order.
    let prices: Vec<f64> = points[..5].iter().map(|p| p.price).collect();
    let legs = [
        leg_ratio(prices[1], prices[2]), // AB
        leg_ratio(prices[2], prices[3]), // BC
        leg_ratio(prices[3], prices[4]), // CD
        leg_ratio(prices[0], prices[1]), // XA
    ];

    HarmonicPattern::ALL
        .iter()
        .filter(|pattern| {
            pattern
                .leg_ratios()
                .iter()
                .zip(legs.iter())
                .all(|(target, actual)| (actual - target).abs() < TOLERANCE)
        })
        .map(|&pattern| HarmonicHit {
            // Completed patterns are reported as buy setups; the ratio
            // tables alone cannot distinguish the bearish mirror.
            pattern,
            direction: PatternDirection::Buy,
        })
        .collect()
}

fn trailing(values: &[f64]) -> &[f64] {
    &values[values.len().saturating_sub(WINDOW)..]
}

fn leg_ratio(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return f64::INFINITY;
    }
    ((to - from) / from).abs()
}
