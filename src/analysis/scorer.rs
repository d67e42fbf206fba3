//! Per-timeframe trend scoring: every indicator and pattern detector casts
//! weighted votes for up, down or sideways, and the strength of the winning
//! label is scaled by the timeframe's importance.
//!
//! An indicator whose value is undefined for the window casts no vote at
//! all rather than a default one.

use serde::{Deserialize, Serialize};

use crate::config::TrendWeights;
use crate::indicators::elliott::{ElliottAnalysis, WaveDirection, WavePattern, WavePhase};
use crate::indicators::harmonic::{HarmonicHit, PatternDirection};
use crate::indicators::ichimoku::{IchimokuAnalysis, IchimokuSignal};
use crate::indicators::levels::FibonacciAnalysis;
use crate::indicators::IndicatorSnapshot;

use super::{TrendLabel, TrendScores};

/// Final classification for one timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendVerdict {
    pub label: TrendLabel,
    /// 0..=100, one decimal place.
    pub strength: f64,
    pub scores: TrendScores,
}

/// Collect the weighted votes for one timeframe's window.
pub fn score_timeframe(
    snapshot: &IndicatorSnapshot,
    harmonic: &[HarmonicHit],
    ichimoku: Option<&IchimokuAnalysis>,
    elliott: &ElliottAnalysis,
    fibonacci: Option<&FibonacciAnalysis>,
    latest_close: Option<f64>,
    weights: &TrendWeights,
) -> TrendScores {
    let mut scores = TrendScores::default();
    let t = weights.technical;

    if let Some(rsi) = snapshot.rsi {
        if rsi > 70.0 {
            scores.add(TrendLabel::Up, t);
        } else if rsi < 30.0 {
            scores.add(TrendLabel::Down, t);
        } else if (45.0..=55.0).contains(&rsi) {
            scores.add(TrendLabel::Sideways, 2 * t);
        } else {
            scores.add(TrendLabel::Sideways, t);
        }
    }

    if let Some(macd) = snapshot.macd {
        let diff = (macd.macd - macd.signal).abs();
        // Within 10% of the signal line counts as flat; an exactly flat
        // market (both lines zero) lands there too.
        if diff < (macd.signal * 0.1).abs() || macd.macd == macd.signal {
            scores.add(TrendLabel::Sideways, 2 * t);
        } else if macd.macd > macd.signal {
            scores.add(TrendLabel::Up, t);
        } else {
            scores.add(TrendLabel::Down, t);
        }
    }

    // The band-width fallback leans on MACD polarity, so both must be
    // defined for this vote.
    if let (Some(bb), Some(macd)) = (snapshot.bollinger, snapshot.macd) {
        if bb.middle != 0.0 {
            let width = (bb.upper - bb.lower) / bb.middle;
            if width < 0.03 {
                scores.add(TrendLabel::Sideways, 2 * t);
            } else if width < 0.05 {
                scores.add(TrendLabel::Sideways, t);
            } else if macd.macd > 0.0 {
                scores.add(TrendLabel::Up, t);
            } else {
                scores.add(TrendLabel::Down, t);
            }
        }
    }

    if let Some(stoch) = snapshot.stochastic {
        if stoch.k > 80.0 {
            scores.add(TrendLabel::Up, t);
        } else if stoch.k < 20.0 {
            scores.add(TrendLabel::Down, t);
        } else if (40.0..=60.0).contains(&stoch.k) {
            scores.add(TrendLabel::Sideways, 2 * t);
        } else {
            scores.add(TrendLabel::Sideways, t);
        }
    }

    if let Some(obv) = snapshot.obv {
        if obv.abs() < 1000.0 {
            scores.add(TrendLabel::Sideways, t);
        } else if obv > 0.0 {
            scores.add(TrendLabel::Up, t);
        } else {
            scores.add(TrendLabel::Down, t);
        }
    }

    if let (Some(adx), Some(macd)) = (snapshot.adx, snapshot.macd) {
        if adx < 20.0 {
            scores.add(TrendLabel::Sideways, 2 * t);
        } else if adx < 25.0 {
            scores.add(TrendLabel::Sideways, t);
        } else if macd.macd > 0.0 {
            scores.add(TrendLabel::Up, t);
        } else {
            scores.add(TrendLabel::Down, t);
        }
    }

    if let Some(cross) = snapshot.ma_cross {
        if cross.slow != 0.0 {
            let diff = (cross.fast - cross.slow).abs();
            if diff < cross.slow * 0.02 {
                scores.add(TrendLabel::Sideways, 2 * t);
            } else if diff < cross.slow * 0.03 {
                scores.add(TrendLabel::Sideways, t);
            } else if cross.fast > cross.slow {
                scores.add(TrendLabel::Up, t);
            } else {
                scores.add(TrendLabel::Down, t);
            }
        }
    }

    score_harmonic(&mut scores, harmonic, weights.harmonic);
    if let Some(ichimoku) = ichimoku {
        score_ichimoku(&mut scores, ichimoku, weights.ichimoku);
    }
    score_elliott(&mut scores, elliott, weights.elliott);
    if let (Some(fib), Some(close)) = (fibonacci, latest_close) {
        score_fibonacci(&mut scores, fib, close, t);
    }

    scores
}

fn score_harmonic(scores: &mut TrendScores, hits: &[HarmonicHit], weight: u32) {
    let has_buy = hits.iter().any(|h| h.direction == PatternDirection::Buy);
    let has_sell = hits.iter().any(|h| h.direction == PatternDirection::Sell);
    match (has_buy, has_sell) {
        (true, false) => scores.add(TrendLabel::Up, weight),
        (false, true) => scores.add(TrendLabel::Down, weight),
        (true, true) => scores.add(TrendLabel::Sideways, weight),
        (false, false) => {}
    }
}

// Only the cross and cloud-position signals vote; lagging-span and cloud
// color stay informational.
fn score_ichimoku(scores: &mut TrendScores, analysis: &IchimokuAnalysis, weight: u32) {
    let bullish = analysis.signals.iter().any(|s| {
        matches!(
            s,
            IchimokuSignal::ConversionAboveBase | IchimokuSignal::PriceAboveCloud
        )
    });
    let bearish = analysis.signals.iter().any(|s| {
        matches!(
            s,
            IchimokuSignal::ConversionBelowBase | IchimokuSignal::PriceBelowCloud
        )
    });
    match (bullish, bearish) {
        (true, false) => scores.add(TrendLabel::Up, weight),
        (false, true) => scores.add(TrendLabel::Down, weight),
        (true, true) => scores.add(TrendLabel::Sideways, weight),
        (false, false) => {}
    }
}

fn score_elliott(scores: &mut TrendScores, analysis: &ElliottAnalysis, weight: u32) {
    // An impulse run votes up whichever way it points; a corrective
    // structure votes down.
    match analysis.pattern {
        WavePattern::ImpulseUp | WavePattern::ImpulseDown => scores.add(TrendLabel::Up, weight),
        WavePattern::Corrective => scores.add(TrendLabel::Down, weight),
        WavePattern::InProgress | WavePattern::Insufficient => {
            scores.add(TrendLabel::Sideways, weight)
        }
    }

    if let Some(phase) = analysis.phase {
        match phase {
            WavePhase::InProgressUp { .. } | WavePhase::PostImpulseUp => {
                scores.add(TrendLabel::Up, weight)
            }
            WavePhase::InProgressDown { .. } | WavePhase::PostImpulseDown => {
                scores.add(TrendLabel::Down, weight)
            }
        }
    }

    if let Some(last) = analysis.waves.last() {
        match last.direction {
            WaveDirection::Up => scores.add(TrendLabel::Up, weight),
            WaveDirection::Down => scores.add(TrendLabel::Down, weight),
        }
    }
}

fn score_fibonacci(scores: &mut TrendScores, fib: &FibonacciAnalysis, close: f64, t: u32) {
    if fib.current.ratio <= 0.382 {
        scores.add(TrendLabel::Up, 2 * t);
    } else if fib.current.ratio >= 0.618 {
        scores.add(TrendLabel::Down, 2 * t);
    } else if fib.current.ratio == 0.5 {
        scores.add(TrendLabel::Sideways, 2 * t);
    }

    if let Some(next) = fib.next {
        if close > 0.0 && (next.price - close) / close < 0.01 {
            if next.ratio > fib.current.ratio {
                scores.add(TrendLabel::Up, t);
            } else {
                scores.add(TrendLabel::Down, t);
            }
        }
    }
}

/// Normalize the winning share of the vote into a 0..=100 strength, scaled
/// by this timeframe's importance relative to the heaviest one. Exactly 0
/// only when no votes were cast.
pub fn trend_strength(scores: &TrendScores, strength_weight: u32, max_strength: u32) -> f64 {
    let total = scores.total();
    if total == 0 {
        return 0.0;
    }

    let base = scores.max() as f64 / total as f64 * 100.0;
    let max_strength = max_strength.max(1);
    let scaled = base * strength_weight as f64 / max_strength as f64;
    (scaled.clamp(0.0, 100.0) * 10.0).round() / 10.0
}
