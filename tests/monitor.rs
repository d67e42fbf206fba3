//! End-to-end cycles against an in-memory candle source and a recording
//! alert sink.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use trend_monitor::analysis::TrendLabel;
use trend_monitor::config::Settings;
use trend_monitor::market::{Candle, CandleData, CandleFetcher, FetchError, TimeframeSpec};
use trend_monitor::monitor::MonitorSession;
use trend_monitor::notify::{NotificationSink, NotifyError};

struct StaticFetcher {
    series: HashMap<String, Vec<Candle>>,
    failing: HashSet<String>,
}

impl StaticFetcher {
    fn new() -> Self {
        Self {
            series: HashMap::new(),
            failing: HashSet::new(),
        }
    }

    fn with_series(mut self, interval: &str, candles: Vec<Candle>) -> Self {
        self.series.insert(interval.to_string(), candles);
        self
    }

    fn with_failure(mut self, interval: &str) -> Self {
        self.failing.insert(interval.to_string());
        self
    }
}

#[async_trait]
impl CandleFetcher for StaticFetcher {
    async fn fetch(&self, spec: &TimeframeSpec) -> Result<CandleData, FetchError> {
        if self.failing.contains(&spec.interval) {
            return Err(FetchError::Malformed("simulated outage".to_string()));
        }
        let candles = self
            .series
            .get(&spec.interval)
            .cloned()
            .unwrap_or_default();
        let tail = candles[candles.len().saturating_sub(spec.limit)..].to_vec();
        Ok(CandleData::from_candles(
            "BTC-USDT".to_string(),
            spec.interval.clone(),
            tail,
        ))
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    messages: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

fn rising_candles(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let close = 100.0 + i as f64;
            Candle {
                timestamp: i as i64 * 60_000,
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.timeframes = vec![
        TimeframeSpec::new("30 minutes", "30m", 200, 4),
        TimeframeSpec::new("1 hour", "1H", 200, 3),
    ];
    settings
}

fn session_with(fetcher: StaticFetcher) -> (MonitorSession, RecordingSink) {
    let sink = RecordingSink::default();
    let session = MonitorSession::new(
        test_settings(),
        Box::new(fetcher),
        Box::new(sink.clone()),
    );
    (session, sink)
}

#[tokio::test]
async fn repeated_aggregate_suppresses_the_alert_but_still_predicts() {
    let fetcher = StaticFetcher::new()
        .with_series("30m", rising_candles(200))
        .with_series("1H", rising_candles(200));
    let (mut session, sink) = session_with(fetcher);

    let first = session.run_trend_cycle().await;
    assert!(first.notified);
    assert_eq!(first.report.dominant, TrendLabel::Up);
    assert_eq!(first.report.aggregate.up, 7);

    let second = session.run_trend_cycle().await;
    assert!(!second.notified);
    assert_eq!(second.report.aggregate, first.report.aggregate);

    // Only the first cycle produced an alert.
    assert_eq!(sink.messages.lock().unwrap().len(), 1);
    // But both cycles recorded a prediction; the latest one is outstanding.
    let outstanding = session.ledger().outstanding().unwrap();
    assert_eq!(outstanding.label, TrendLabel::Up);
    assert_eq!(outstanding.timestamp, second.report.generated_at);
}

#[tokio::test]
async fn failed_timeframe_is_skipped_and_the_cycle_continues() {
    let fetcher = StaticFetcher::new()
        .with_series("30m", rising_candles(200))
        .with_failure("1H");
    let (mut session, _sink) = session_with(fetcher);

    let outcome = session.run_trend_cycle().await;
    assert_eq!(outcome.report.timeframes.len(), 1);
    assert_eq!(outcome.report.timeframes[0].interval, "30m");
    // Aggregate only carries the surviving timeframe's weight.
    assert_eq!(outcome.report.aggregate.up, 4);
    assert_eq!(outcome.report.reference_price, Some(299.0));
}

#[tokio::test]
async fn all_fetches_failing_still_yields_a_prediction() {
    let fetcher = StaticFetcher::new().with_failure("30m").with_failure("1H");
    let (mut session, sink) = session_with(fetcher);

    let outcome = session.run_trend_cycle().await;
    assert!(outcome.report.timeframes.is_empty());
    // Zero aggregate ties break to Up and the prediction has no price.
    assert_eq!(outcome.report.dominant, TrendLabel::Up);
    let outstanding = session.ledger().outstanding().unwrap();
    assert_eq!(outstanding.reference_price, None);
    assert_eq!(sink.messages.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn accuracy_cycle_resolves_the_outstanding_prediction() {
    let fetcher = StaticFetcher::new()
        .with_series("30m", rising_candles(200))
        .with_series("1H", rising_candles(200));
    let (mut session, sink) = session_with(fetcher);

    session.run_trend_cycle().await;

    // Last 3 closes are 297, 298, 299: +0.67% beats the 0.5% threshold.
    let report = session.run_accuracy_cycle().await.unwrap();
    assert_eq!(report.actual, TrendLabel::Up);
    assert!(report.correct);
    assert_eq!(report.stats.total, 1);
    assert_eq!(report.stats.correct, 1);
    assert!(report.price_change_pct > 0.5);

    // Slot cleared: a second tick without a new prediction resolves nothing.
    assert!(session.run_accuracy_cycle().await.is_none());
    assert_eq!(session.ledger().stats().total, 1);

    // One trend alert plus one accuracy alert.
    assert_eq!(sink.messages.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn accuracy_tick_without_a_prediction_is_silent() {
    let fetcher = StaticFetcher::new().with_series("30m", rising_candles(200));
    let (mut session, sink) = session_with(fetcher);

    assert!(session.run_accuracy_cycle().await.is_none());
    assert!(sink.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn overwritten_prediction_is_never_counted() {
    let fetcher = StaticFetcher::new()
        .with_series("30m", rising_candles(200))
        .with_series("1H", rising_candles(200));
    let (mut session, _sink) = session_with(fetcher);

    session.run_trend_cycle().await;
    session.run_trend_cycle().await; // overwrites the first forecast

    session.run_accuracy_cycle().await.unwrap();
    assert_eq!(session.ledger().stats().total, 1);
}

#[tokio::test]
async fn short_accuracy_window_skips_resolution() {
    let fetcher = StaticFetcher::new()
        .with_series("30m", rising_candles(200))
        .with_series("1H", rising_candles(200));
    let (mut session, _sink) = session_with(fetcher);
    session.run_trend_cycle().await;

    // Replace the source with one that cannot fill the lookback window.
    let starved = StaticFetcher::new()
        .with_series("30m", rising_candles(2))
        .with_series("1H", rising_candles(200));
    let sink = RecordingSink::default();
    let mut starved_session =
        MonitorSession::new(test_settings(), Box::new(starved), Box::new(sink));
    starved_session.run_trend_cycle().await;
    assert!(starved_session.run_accuracy_cycle().await.is_none());
    // The forecast stays outstanding for a later, fuller window.
    assert!(starved_session.ledger().outstanding().is_some());
}
