//! Runs the full per-timeframe pipeline and folds the verdicts of all
//! timeframes into one weighted cross-timeframe report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::indicators::elliott::{analyze_elliott, ElliottAnalysis};
use crate::indicators::harmonic::{analyze_harmonic, HarmonicHit};
use crate::indicators::ichimoku::{analyze_ichimoku, IchimokuAnalysis};
use crate::indicators::levels::{
    analyze_fibonacci, analyze_support_resistance, FibonacciAnalysis, SupportResistance,
};
use crate::indicators::{compute_snapshot, IndicatorSnapshot};
use crate::market::{CandleData, TimeframeSpec};

use super::scorer::{score_timeframe, trend_strength, TrendVerdict};
use super::TrendLabel;

/// Everything one timeframe's window produced: indicator values, pattern
/// detector outputs and the scored verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeAnalysis {
    pub snapshot: IndicatorSnapshot,
    pub harmonic: Vec<HarmonicHit>,
    pub ichimoku: Option<IchimokuAnalysis>,
    pub elliott: ElliottAnalysis,
    pub support_resistance: SupportResistance,
    pub fibonacci: Option<FibonacciAnalysis>,
    pub last_close: Option<f64>,
    pub verdict: TrendVerdict,
}

/// Run indicators, pattern detectors and the scorer over one candle window.
pub fn analyze_timeframe(data: &CandleData, settings: &Settings) -> TimeframeAnalysis {
    let snapshot = compute_snapshot(data, &settings.indicators);
    let harmonic = analyze_harmonic(&data.high, &data.low);
    let ichimoku = analyze_ichimoku(&data.high, &data.low, &data.close);
    let elliott = analyze_elliott(&data.close);
    let support_resistance = analyze_support_resistance(&data.high, &data.low, &data.close);
    let fibonacci = analyze_fibonacci(&data.high, &data.low, &data.close);
    let last_close = data.last_close();

    let scores = score_timeframe(
        &snapshot,
        &harmonic,
        ichimoku.as_ref(),
        &elliott,
        fibonacci.as_ref(),
        last_close,
        &settings.weights,
    );

    let strength = trend_strength(
        &scores,
        settings.strength_for(&data.interval),
        settings.max_strength(),
    );
    let verdict = TrendVerdict {
        label: scores.dominant(),
        strength,
        scores,
    };

    TimeframeAnalysis {
        snapshot,
        harmonic,
        ichimoku,
        elliott,
        support_resistance,
        fibonacci,
        last_close,
        verdict,
    }
}

/// One timeframe's contribution to the cross-timeframe verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeVerdict {
    pub name: String,
    pub interval: String,
    pub weight: u32,
    pub label: TrendLabel,
    pub strength: f64,
}

/// Per-label sums of timeframe weights for one cycle. Exact integer
/// equality against the previous cycle drives alert suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeightedAggregate {
    pub up: u32,
    pub down: u32,
    pub sideways: u32,
}

impl WeightedAggregate {
    pub fn add(&mut self, label: TrendLabel, weight: u32) {
        match label {
            TrendLabel::Up => self.up += weight,
            TrendLabel::Down => self.down += weight,
            TrendLabel::Sideways => self.sideways += weight,
        }
    }

    pub fn get(&self, label: TrendLabel) -> u32 {
        match label {
            TrendLabel::Up => self.up,
            TrendLabel::Down => self.down,
            TrendLabel::Sideways => self.sideways,
        }
    }

    pub fn dominant(&self) -> TrendLabel {
        let max = self.up.max(self.down).max(self.sideways);
        for label in TrendLabel::PRIORITY {
            if self.get(label) == max {
                return label;
            }
        }
        TrendLabel::Sideways
    }
}

/// One trend cycle's full output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub timeframes: Vec<TimeframeVerdict>,
    pub aggregate: WeightedAggregate,
    pub dominant: TrendLabel,
    /// Close of the reference timeframe, backing the recorded prediction.
    pub reference_price: Option<f64>,
    /// Detailed analysis of the reference timeframe, for alert rendering.
    pub reference: Option<TimeframeAnalysis>,
}

/// Fold per-timeframe analyses into the weighted cross-timeframe report.
/// Tolerates any subset of the configured timeframes; an empty set still
/// yields a (zero-aggregate) report.
pub fn aggregate_timeframes(
    symbol: &str,
    entries: &[(TimeframeSpec, TimeframeAnalysis)],
    reference_interval: &str,
) -> TrendReport {
    let mut aggregate = WeightedAggregate::default();
    let mut timeframes = Vec::with_capacity(entries.len());
    let mut reference_price = None;
    let mut reference = None;

    for (spec, analysis) in entries {
        aggregate.add(analysis.verdict.label, spec.weight);
        timeframes.push(TimeframeVerdict {
            name: spec.name.clone(),
            interval: spec.interval.clone(),
            weight: spec.weight,
            label: analysis.verdict.label,
            strength: analysis.verdict.strength,
        });
        if spec.interval == reference_interval {
            reference_price = analysis.last_close;
            reference = Some(analysis.clone());
        }
    }

    TrendReport {
        symbol: symbol.to_string(),
        generated_at: Utc::now(),
        timeframes,
        aggregate,
        dominant: aggregate.dominant(),
        reference_price,
        reference,
    }
}
