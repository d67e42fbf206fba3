pub mod accuracy;
pub mod aggregator;
pub mod scorer;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::accuracy::{AccuracyReport, AccuracyStats, Prediction, PredictionLedger};
pub use self::aggregator::{
    aggregate_timeframes, analyze_timeframe, TimeframeAnalysis, TimeframeVerdict, TrendReport,
    WeightedAggregate,
};
pub use self::scorer::{score_timeframe, trend_strength, TrendVerdict};

/// The three trend classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendLabel {
    Up,
    Down,
    Sideways,
}

impl TrendLabel {
    /// Fixed tie-break order consulted wherever scores tie.
    pub const PRIORITY: [TrendLabel; 3] = [TrendLabel::Up, TrendLabel::Down, TrendLabel::Sideways];

    pub fn as_str(self) -> &'static str {
        match self {
            TrendLabel::Up => "up",
            TrendLabel::Down => "down",
            TrendLabel::Sideways => "sideways",
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated vote points per label for a single timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrendScores {
    pub up: u32,
    pub down: u32,
    pub sideways: u32,
}

impl TrendScores {
    pub fn add(&mut self, label: TrendLabel, points: u32) {
        match label {
            TrendLabel::Up => self.up += points,
            TrendLabel::Down => self.down += points,
            TrendLabel::Sideways => self.sideways += points,
        }
    }

    pub fn get(&self, label: TrendLabel) -> u32 {
        match label {
            TrendLabel::Up => self.up,
            TrendLabel::Down => self.down,
            TrendLabel::Sideways => self.sideways,
        }
    }

    pub fn total(&self) -> u32 {
        self.up + self.down + self.sideways
    }

    pub fn max(&self) -> u32 {
        self.up.max(self.down).max(self.sideways)
    }

    /// Highest-scoring label, ties resolved by the fixed priority order.
    pub fn dominant(&self) -> TrendLabel {
        let max = self.max();
        for label in TrendLabel::PRIORITY {
            if self.get(label) == max {
                return label;
            }
        }
        TrendLabel::Sideways
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_prefers_up_then_down_on_ties() {
        let zero = TrendScores::default();
        assert_eq!(zero.dominant(), TrendLabel::Up);

        let mut tied = TrendScores::default();
        tied.add(TrendLabel::Down, 5);
        tied.add(TrendLabel::Sideways, 5);
        assert_eq!(tied.dominant(), TrendLabel::Down);

        let mut sideways = TrendScores::default();
        sideways.add(TrendLabel::Sideways, 6);
        sideways.add(TrendLabel::Up, 5);
        assert_eq!(sideways.dominant(), TrendLabel::Sideways);
    }

    #[test]
    fn totals_track_added_points() {
        let mut scores = TrendScores::default();
        scores.add(TrendLabel::Up, 3);
        scores.add(TrendLabel::Up, 2);
        scores.add(TrendLabel::Down, 4);
        assert_eq!(scores.total(), 9);
        assert_eq!(scores.max(), 5);
        assert_eq!(scores.get(TrendLabel::Up), 5);
    }
}
