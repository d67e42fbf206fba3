/// Swing highs and lows found by a symmetric five-bar scan: a pivot high
/// beats both highs on each side, a pivot low undercuts both lows.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotKind {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtremePoint {
    pub kind: PivotKind,
    pub price: f64,
    pub index: usize,
}

/// Scan a high/low window for pivots, returned in chronological order.
/// The first and last two bars can never qualify.
pub fn find_extreme_points(high: &[f64], low: &[f64]) -> Vec<ExtremePoint> {
    let n = high.len().min(low.len());
    let mut points = Vec::new();
    if n < 5 {
        return points;
    }

    for i in 2..n - 2 {
        if high[i] > high[i - 1]
            && high[i] > high[i - 2]
            && high[i] > high[i + 1]
            && high[i] > high[i + 2]
        {
            points.push(ExtremePoint {
                kind: PivotKind::High,
                price: high[i],
                index: i,
            });
        }
        if low[i] < low[i - 1] && low[i] < low[i - 2] && low[i] < low[i + 1] && low[i] < low[i + 2]
        {
            points.push(ExtremePoint {
                kind: PivotKind::Low,
                price: low[i],
                index: i,
            });
        }
    }

    points
}
