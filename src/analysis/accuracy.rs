//! Single-slot prediction ledger with process-lifetime accuracy counters.
//! Each trend cycle overwrites the outstanding forecast; the accuracy cycle
//! resolves whichever forecast is outstanding when it fires, so a forecast
//! overwritten before its tick is dropped without being counted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TrendLabel;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub timestamp: DateTime<Utc>,
    pub label: TrendLabel,
    pub reference_price: Option<f64>,
}

/// Cumulative resolution counters. Never reset while the process lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccuracyStats {
    pub total: u32,
    pub correct: u32,
    pub incorrect: u32,
}

impl AccuracyStats {
    /// Hit rate as a percentage, two decimal places. Zero before any
    /// resolution.
    pub fn accuracy_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let pct = self.correct as f64 / self.total as f64 * 100.0;
        (pct * 100.0).round() / 100.0
    }
}

/// Outcome of resolving one prediction against realized price movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub prediction: Prediction,
    pub actual: TrendLabel,
    pub price_change_pct: f64,
    pub correct: bool,
    pub stats: AccuracyStats,
}

#[derive(Debug, Clone, Default)]
pub struct PredictionLedger {
    outstanding: Option<Prediction>,
    stats: AccuracyStats,
}

impl PredictionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a forecast, returning the unresolved one it displaced, if any.
    pub fn record(&mut self, prediction: Prediction) -> Option<Prediction> {
        self.outstanding.replace(prediction)
    }

    pub fn outstanding(&self) -> Option<&Prediction> {
        self.outstanding.as_ref()
    }

    pub fn stats(&self) -> AccuracyStats {
        self.stats
    }

    /// Resolve the outstanding forecast against the realized trend. Clears
    /// the slot and updates the counters; None when the slot was empty.
    pub fn resolve(&mut self, actual: TrendLabel, price_change_pct: f64) -> Option<AccuracyReport> {
        let prediction = self.outstanding.take()?;
        let correct = prediction.label == actual;

        self.stats.total += 1;
        if correct {
            self.stats.correct += 1;
        } else {
            self.stats.incorrect += 1;
        }

        Some(AccuracyReport {
            prediction,
            actual,
            price_change_pct,
            correct,
            stats: self.stats,
        })
    }
}

/// Classify a realized percentage move against the configured threshold.
pub fn classify_move(change_pct: f64, threshold_pct: f64) -> TrendLabel {
    if change_pct > threshold_pct {
        TrendLabel::Up
    } else if change_pct < -threshold_pct {
        TrendLabel::Down
    } else {
        TrendLabel::Sideways
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(label: TrendLabel) -> Prediction {
        Prediction {
            timestamp: Utc::now(),
            label,
            reference_price: Some(100.0),
        }
    }

    #[test]
    fn classifies_moves_against_the_threshold() {
        assert_eq!(classify_move(0.6, 0.5), TrendLabel::Up);
        assert_eq!(classify_move(-0.6, 0.5), TrendLabel::Down);
        assert_eq!(classify_move(0.5, 0.5), TrendLabel::Sideways);
        assert_eq!(classify_move(-0.5, 0.5), TrendLabel::Sideways);
        assert_eq!(classify_move(0.0, 0.5), TrendLabel::Sideways);
    }

    #[test]
    fn resolution_updates_counters_and_clears_the_slot() {
        let mut ledger = PredictionLedger::new();
        assert!(ledger.resolve(TrendLabel::Up, 1.0).is_none());

        ledger.record(prediction(TrendLabel::Up));
        let report = ledger.resolve(TrendLabel::Up, 1.2).unwrap();
        assert!(report.correct);
        assert_eq!(report.stats.total, 1);
        assert_eq!(report.stats.correct, 1);
        assert!(ledger.outstanding().is_none());

        ledger.record(prediction(TrendLabel::Down));
        let report = ledger.resolve(TrendLabel::Sideways, 0.1).unwrap();
        assert!(!report.correct);
        assert_eq!(report.stats.total, 2);
        assert_eq!(report.stats.incorrect, 1);
        assert_eq!(report.stats.accuracy_percent(), 50.0);
    }

    #[test]
    fn overwritten_forecast_is_dropped_uncounted() {
        let mut ledger = PredictionLedger::new();
        ledger.record(prediction(TrendLabel::Up));
        let displaced = ledger.record(prediction(TrendLabel::Down));
        assert_eq!(displaced.unwrap().label, TrendLabel::Up);

        ledger.resolve(TrendLabel::Down, -1.0).unwrap();
        // Only the surviving forecast was counted.
        assert_eq!(ledger.stats().total, 1);
    }

    #[test]
    fn accuracy_percent_rounds_to_two_decimals() {
        let stats = AccuracyStats {
            total: 3,
            correct: 1,
            incorrect: 2,
        };
        assert_eq!(stats.accuracy_percent(), 33.33);
        assert_eq!(AccuracyStats::default().accuracy_percent(), 0.0);
    }
}
