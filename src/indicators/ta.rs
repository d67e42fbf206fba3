// Array-based implementations of the standard indicators. Every function
// returns None (or None-filled slots) when the series is shorter than the
// lookback, never a partially-seeded value.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerValue {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticValue {
    pub k: f64,
    pub d: f64,
}

/// Simple moving average, aligned to the input: the first `period - 1`
/// slots are None.
pub fn sma_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let mut sum: f64 = values[..period].iter().sum();
    out[period - 1] = Some(sum / period as f64);
    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out[i] = Some(sum / period as f64);
    }
    out
}

/// Latest simple moving average over the trailing `period` values.
pub fn sma_last(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Exponential moving average seeded with the SMA of the first `period`
/// values, aligned to the input.
pub fn ema_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(ema);
    for i in period..values.len() {
        ema = values[i] * alpha + ema * (1.0 - alpha);
        out[i] = Some(ema);
    }
    out
}

/// Latest Wilder-smoothed RSI. A series with zero average loss reads 100;
/// a dead-flat series (zero gain and zero loss) reads neutral 50.
pub fn rsi_last(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period + 1 {
        return None;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = values[i] - values[i - 1];
        if change >= 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    for i in period + 1..values.len() {
        let change = values[i] - values[i - 1];
        let (gain, loss) = if change >= 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            Some(50.0)
        } else {
            Some(100.0)
        }
    } else {
        let rs = avg_gain / avg_loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    }
}

/// Latest MACD value: fast EMA minus slow EMA, with an EMA of the MACD line
/// as the signal. Defined once `slow + signal - 1` values are available.
pub fn macd_last(values: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdValue> {
    if fast == 0 || slow == 0 || signal == 0 || fast >= slow {
        return None;
    }
    if values.len() < slow + signal - 1 {
        return None;
    }

    let fast_ema = ema_series(values, fast);
    let slow_ema = ema_series(values, slow);

    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .filter_map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let signal_line = ema_series(&macd_line, signal);
    let macd = *macd_line.last()?;
    let sig = (*signal_line.last()?)?;

    Some(MacdValue {
        macd,
        signal: sig,
        histogram: macd - sig,
    })
}

/// Latest Bollinger bands: SMA ± `std_dev` population standard deviations.
pub fn bollinger_last(values: &[f64], period: usize, std_dev: f64) -> Option<BollingerValue> {
    if period == 0 || values.len() < period {
        return None;
    }

    let window = &values[values.len() - period..];
    let middle = window.iter().sum::<f64>() / period as f64;
    let variance = window.iter().map(|v| (v - middle).powi(2)).sum::<f64>() / period as f64;
    let sd = variance.sqrt();

    Some(BollingerValue {
        upper: middle + std_dev * sd,
        middle,
        lower: middle - std_dev * sd,
    })
}

/// Latest Stochastic oscillator. %K over `period`, %D as the SMA of the last
/// `signal_period` %K values. A zero high-low range reads neutral 50.
pub fn stochastic_last(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
    signal_period: usize,
) -> Option<StochasticValue> {
    let n = close.len().min(high.len()).min(low.len());
    if period == 0 || signal_period == 0 || n < period + signal_period - 1 {
        return None;
    }

    let k_at = |i: usize| -> f64 {
        let start = i + 1 - period;
        let highest = high[start..=i].iter().cloned().fold(f64::MIN, f64::max);
        let lowest = low[start..=i].iter().cloned().fold(f64::MAX, f64::min);
        let range = highest - lowest;
        if range == 0.0 {
            50.0
        } else {
            (close[i] - lowest) / range * 100.0
        }
    };

    let k = k_at(n - 1);
    let d = (0..signal_period).map(|j| k_at(n - 1 - j)).sum::<f64>() / signal_period as f64;

    Some(StochasticValue { k, d })
}

/// Cumulative On-Balance Volume over the whole series, starting at zero.
pub fn obv_last(close: &[f64], volume: &[f64]) -> Option<f64> {
    if close.is_empty() || close.len() != volume.len() {
        return None;
    }

    let mut obv = 0.0;
    for i in 1..close.len() {
        if close[i] > close[i - 1] {
            obv += volume[i];
        } else if close[i] < close[i - 1] {
            obv -= volume[i];
        }
    }
    Some(obv)
}

/// Latest Wilder ADX. Needs `2 * period` bars: one period to seed the
/// smoothed DM/TR sums, another to seed the ADX average of DX.
pub fn adx_last(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Option<f64> {
    let n = close.len().min(high.len()).min(low.len());
    if period == 0 || n < 2 * period {
        return None;
    }

    let dm_tr = |i: usize| -> (f64, f64, f64) {
        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];
        let plus_dm = if up > down && up > 0.0 { up } else { 0.0 };
        let minus_dm = if down > up && down > 0.0 { down } else { 0.0 };
        let tr = (high[i] - low[i])
            .max((high[i] - close[i - 1]).abs())
            .max((low[i] - close[i - 1]).abs());
        (tr, plus_dm, minus_dm)
    };

    // A zero true range or zero DI sum yields DX = 0 rather than NaN.
    let dx_of = |tr_s: f64, plus_s: f64, minus_s: f64| -> f64 {
        if tr_s == 0.0 {
            return 0.0;
        }
        let plus_di = 100.0 * plus_s / tr_s;
        let minus_di = 100.0 * minus_s / tr_s;
        let di_sum = plus_di + minus_di;
        if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        }
    };

    let mut tr_s = 0.0;
    let mut plus_s = 0.0;
    let mut minus_s = 0.0;
    for i in 1..=period {
        let (tr, plus, minus) = dm_tr(i);
        tr_s += tr;
        plus_s += plus;
        minus_s += minus;
    }

    let mut dx_values = vec![dx_of(tr_s, plus_s, minus_s)];
    for i in period + 1..n {
        let (tr, plus, minus) = dm_tr(i);
        tr_s = tr_s - tr_s / period as f64 + tr;
        plus_s = plus_s - plus_s / period as f64 + plus;
        minus_s = minus_s - minus_s / period as f64 + minus;
        dx_values.push(dx_of(tr_s, plus_s, minus_s));
    }

    if dx_values.len() < period {
        return None;
    }

    let mut adx = dx_values[..period].iter().sum::<f64>() / period as f64;
    for &dx in &dx_values[period..] {
        adx = (adx * (period - 1) as f64 + dx) / period as f64;
    }
    Some(adx)
}
