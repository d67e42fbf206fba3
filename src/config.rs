use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::market::TimeframeSpec;

/// Runtime settings. Every field has a default so the monitor runs with no
/// config file at all; a TOML file and `TREND__`-prefixed environment
/// variables can override any of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub symbol: String,
    pub base_url: String,
    pub timeframes: Vec<TimeframeSpec>,
    pub indicators: IndicatorSettings,
    pub weights: TrendWeights,
    pub strength_weights: HashMap<String, u32>,
    pub schedule: ScheduleSettings,
    pub accuracy: AccuracySettings,
    pub telegram: Option<TelegramSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub stoch_period: usize,
    pub stoch_signal: usize,
    pub adx_period: usize,
    pub ma_fast: usize,
    pub ma_slow: usize,
    pub ma_short: Vec<usize>,
    pub ma_medium: Vec<usize>,
    pub ma_long: Vec<usize>,
}

/// Per-detector vote weights.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TrendWeights {
    pub technical: u32,
    pub harmonic: u32,
    pub ichimoku: u32,
    pub elliott: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    pub trend_secs: u64,
    pub accuracy_secs: u64,
    pub status_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccuracySettings {
    /// Timeframe whose close backs predictions and verification.
    pub interval: String,
    /// How many recent candles may confirm a predicted move.
    pub lookback: usize,
    /// Minimum percent move counted as up or down.
    pub threshold_pct: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            symbol: "BTC-USDT".to_string(),
            base_url: "https://www.okx.com/api/v5".to_string(),
            timeframes: default_timeframes(),
            indicators: IndicatorSettings::default(),
            weights: TrendWeights::default(),
            strength_weights: default_strength_weights(),
            schedule: ScheduleSettings::default(),
            accuracy: AccuracySettings::default(),
            telegram: None,
        }
    }
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bb_period: 20,
            bb_std_dev: 2.0,
            stoch_period: 14,
            stoch_signal: 3,
            adx_period: 14,
            ma_fast: 20,
            ma_slow: 50,
            ma_short: vec![10, 20, 50],
            ma_medium: vec![100, 120],
            ma_long: vec![200],
        }
    }
}

impl Default for TrendWeights {
    fn default() -> Self {
        Self {
            technical: 2,
            harmonic: 5,
            ichimoku: 6,
            elliott: 4,
        }
    }
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            trend_secs: 300,
            accuracy_secs: 1800,
            status_secs: 30,
        }
    }
}

impl Default for AccuracySettings {
    fn default() -> Self {
        Self {
            interval: "30m".to_string(),
            lookback: 3,
            threshold_pct: 0.5,
        }
    }
}

fn default_timeframes() -> Vec<TimeframeSpec> {
    vec![
        TimeframeSpec::new("1 minute", "1m", 200, 1),
        TimeframeSpec::new("5 minutes", "5m", 200, 2),
        TimeframeSpec::new("30 minutes", "30m", 200, 4),
        TimeframeSpec::new("1 hour", "1H", 200, 3),
        TimeframeSpec::new("4 hours", "4H", 200, 2),
        TimeframeSpec::new("12 hours", "12H", 200, 2),
        TimeframeSpec::new("1 day", "1D", 200, 2),
    ]
}

fn default_strength_weights() -> HashMap<String, u32> {
    [
        ("1m", 1),
        ("5m", 1),
        ("30m", 2),
        ("1H", 3),
        ("4H", 4),
        ("12H", 5),
        ("1D", 6),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

impl Settings {
    /// Load settings from an optional TOML file plus `TREND__` environment
    /// overrides, on top of the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let cfg = builder
            .add_source(
                config::Environment::with_prefix("TREND")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read configuration sources")?;

        // An empty source set deserializes every field through its default.
        let settings: Settings = cfg
            .try_deserialize()
            .context("invalid configuration values")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.timeframes.is_empty() {
            anyhow::bail!("at least one timeframe must be configured");
        }
        if !self
            .timeframes
            .iter()
            .any(|tf| tf.interval == self.accuracy.interval)
        {
            anyhow::bail!(
                "accuracy interval {} is not among the configured timeframes",
                self.accuracy.interval
            );
        }
        if self.accuracy.lookback == 0 {
            anyhow::bail!("accuracy lookback must be at least 1");
        }
        Ok(())
    }

    /// Strength-scaling weight for a timeframe interval, defaulting to 1
    /// when the interval has no entry.
    pub fn strength_for(&self, interval: &str) -> u32 {
        self.strength_weights.get(interval).copied().unwrap_or(1)
    }

    /// The largest configured strength weight, used to normalize scores.
    pub fn max_strength(&self) -> u32 {
        self.strength_weights.values().copied().max().unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_timeframes() {
        let settings = Settings::default();
        assert_eq!(settings.timeframes.len(), 7);
        assert!(settings.validate().is_ok());
        for tf in &settings.timeframes {
            assert_eq!(tf.limit, 200);
            assert!(settings.strength_weights.contains_key(&tf.interval));
        }
        assert_eq!(settings.max_strength(), 6);
        assert_eq!(settings.strength_for("1D"), 6);
        assert_eq!(settings.strength_for("unknown"), 1);
    }

    #[test]
    fn accuracy_interval_must_match_a_timeframe() {
        let mut settings = Settings::default();
        settings.accuracy.interval = "2H".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn default_weights_match_detector_ranking() {
        let w = TrendWeights::default();
        assert_eq!((w.technical, w.harmonic, w.ichimoku, w.elliott), (2, 5, 6, 4));
    }
}
