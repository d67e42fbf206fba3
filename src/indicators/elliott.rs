//! Elliott-style wave segmentation of the close series, with a pattern
//! classification over the most recent waves and a phase/target estimate
//! for the wave in progress.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub direction: WaveDirection,
    pub start: usize,
    pub end: usize,
    pub high: f64,
    pub low: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePattern {
    ImpulseUp,
    ImpulseDown,
    Corrective,
    InProgress,
    Insufficient,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Five or more waves counted and the latest one points up.
    PostImpulseUp,
    /// Five or more waves counted and the latest one points down.
    PostImpulseDown,
    InProgressUp { target: Option<f64> },
    InProgressDown { target: Option<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElliottAnalysis {
    pub waves: Vec<Wave>,
    pub pattern: WavePattern,
    pub phase: Option<WavePhase>,
}

/// Segment the close series into waves. A new wave starts whenever price
/// breaks the running extreme against the current direction; the opposite
/// extreme carries over from the broken wave.
fn identify_waves(closes: &[f64]) -> Vec<Wave> {
    let mut waves = Vec::new();
    if closes.is_empty() {
        return waves;
    }

    let mut direction: Option<WaveDirection> = None;
    let mut start = 0usize;
    let mut end = 0usize;
    let mut high = closes[0];
    let mut low = closes[0];

    for (i, &price) in closes.iter().enumerate().skip(1) {
        if price > high {
            if direction == Some(WaveDirection::Down) {
                waves.push(Wave {
                    direction: WaveDirection::Down,
                    start,
                    end,
                    high,
                    low,
                });
                start = i - 1;
                high = price;
                // the low survives the flip as the new wave's base
            } else {
                high = price;
            }
            direction = Some(WaveDirection::Up);
            end = i;
        } else if price < low {
            if direction == Some(WaveDirection::Up) {
                waves.push(Wave {
                    direction: WaveDirection::Up,
                    start,
                    end,
                    high,
                    low,
                });
                start = i - 1;
                low = price;
            } else {
                low = price;
            }
            direction = Some(WaveDirection::Down);
            end = i;
        }
    }

    if let Some(direction) = direction {
        waves.push(Wave {
            direction,
            start,
            end,
            high,
            low,
        });
    }

    waves
}

// Impulse shapes are matched against the raw direction string of the last
// five (or three) waves.
fn classify_pattern(waves: &[Wave]) -> WavePattern {
    if waves.len() < 5 {
        return WavePattern::Insufficient;
    }

    let tail: Vec<&str> = waves[waves.len() - 5..]
        .iter()
        .map(|w| match w.direction {
            WaveDirection::Up => "up",
            WaveDirection::Down => "down",
        })
        .collect();
    let joined = tail.join("-");

    match joined.as_str() {
        "up-up-down-up-up" => WavePattern::ImpulseUp,
        "down-down-up-down-down" => WavePattern::ImpulseDown,
        "down-up-down" | "up-down-up" => WavePattern::Corrective,
        _ => WavePattern::InProgress,
    }
}

fn classify_phase(waves: &[Wave]) -> Option<WavePhase> {
    let last = waves.last()?;

    if waves.len() >= 5 {
        return Some(match last.direction {
            WaveDirection::Up => WavePhase::PostImpulseUp,
            WaveDirection::Down => WavePhase::PostImpulseDown,
        });
    }

    // Project a 0.618 extension of the previous wave's height.
    let target = if waves.len() >= 2 {
        let prev = &waves[waves.len() - 2];
        let height = (prev.high - prev.low).abs();
        Some(match last.direction {
            WaveDirection::Up => last.high + height * 0.618,
            WaveDirection::Down => last.low - height * 0.618,
        })
    } else {
        None
    };

    Some(match last.direction {
        WaveDirection::Up => WavePhase::InProgressUp { target },
        WaveDirection::Down => WavePhase::InProgressDown { target },
    })
}

pub fn analyze_elliott(closes: &[f64]) -> ElliottAnalysis {
    let waves = identify_waves(closes);
    let pattern = classify_pattern(&waves);
    let phase = classify_phase(&waves);
    ElliottAnalysis {
        waves,
        pattern,
        phase,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_flat_series_have_no_waves() {
        assert!(identify_waves(&[]).is_empty());
        assert!(identify_waves(&[100.0; 10]).is_empty());

        let analysis = analyze_elliott(&[100.0; 10]);
        assert_eq!(analysis.pattern, WavePattern::Insufficient);
        assert_eq!(analysis.phase, None);
    }

    #[test]
    fn waves_alternate_and_carry_the_opposite_extreme() {
        // up to 110, down to 95, up to 120
        let closes = [100.0, 105.0, 110.0, 102.0, 95.0, 108.0, 120.0];
        let waves = identify_waves(&closes);

        assert_eq!(waves.len(), 3);
        assert_eq!(waves[0].direction, WaveDirection::Up);
        assert_eq!(waves[1].direction, WaveDirection::Down);
        assert_eq!(waves[2].direction, WaveDirection::Up);
        // The down wave keeps the prior high; the final up wave keeps the
        // prior low.
        assert_eq!(waves[1].high, 110.0);
        assert_eq!(waves[2].low, 95.0);
        assert_eq!(waves[2].high, 120.0);

        for pair in waves.windows(2) {
            assert_ne!(pair[0].direction, pair[1].direction);
        }
    }

    #[test]
    fn monotonic_rise_is_one_wave_with_a_projected_target() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let analysis = analyze_elliott(&closes);

        assert_eq!(analysis.waves.len(), 1);
        assert_eq!(analysis.pattern, WavePattern::Insufficient);
        // A single wave has no prior height to extend.
        assert_eq!(
            analysis.phase,
            Some(WavePhase::InProgressUp { target: None })
        );
    }

    #[test]
    fn two_waves_project_a_fib_extension() {
        // up 100->120 then down to 90
        let closes = [100.0, 110.0, 120.0, 105.0, 90.0];
        let analysis = analyze_elliott(&closes);

        assert_eq!(analysis.waves.len(), 2);
        let target = match analysis.phase {
            Some(WavePhase::InProgressDown { target }) => target,
            other => panic!("unexpected phase {other:?}"),
        };
        // prev wave height 120 - 100, extension below the current low
        assert_eq!(target, Some(90.0 - 20.0 * 0.618));
    }

    #[test]
    fn five_waves_enter_the_post_impulse_phase() {
        // Zigzag producing five alternating waves ending with an up leg.
        let closes = [
            100.0, 120.0, 90.0, 130.0, 85.0, 140.0,
        ];
        let analysis = analyze_elliott(&closes);

        assert!(analysis.waves.len() >= 5);
        assert_eq!(analysis.phase, Some(WavePhase::PostImpulseUp));
        // Alternating waves never spell an impulse run.
        assert_eq!(analysis.pattern, WavePattern::InProgress);
    }
}
