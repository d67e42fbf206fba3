//! Long-lived monitoring session. Owns the cross-cycle state (previous
//! aggregate, prediction ledger) and exposes one entry point per timer
//! cadence. Nothing in here terminates the process; every failure is
//! logged and the cycle carries on or returns early.

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::analysis::{
    accuracy::classify_move, aggregate_timeframes, analyze_timeframe, AccuracyReport,
    Prediction, PredictionLedger, TimeframeAnalysis, TrendReport, WeightedAggregate,
};
use crate::config::Settings;
use crate::market::{CandleFetcher, TimeframeSpec};
use crate::notify::{render_accuracy_message, render_trend_message, NotificationSink};

/// What one trend cycle did.
#[derive(Debug, Clone)]
pub struct TrendCycleOutcome {
    pub report: TrendReport,
    /// False when change-suppression swallowed the alert.
    pub notified: bool,
}

pub struct MonitorSession {
    settings: Settings,
    fetcher: Box<dyn CandleFetcher>,
    sink: Box<dyn NotificationSink>,
    previous_aggregate: Option<WeightedAggregate>,
    ledger: PredictionLedger,
}

impl MonitorSession {
    pub fn new(
        settings: Settings,
        fetcher: Box<dyn CandleFetcher>,
        sink: Box<dyn NotificationSink>,
    ) -> Self {
        Self {
            settings,
            fetcher,
            sink,
            previous_aggregate: None,
            ledger: PredictionLedger::new(),
        }
    }

    /// Analyze every configured timeframe, aggregate, alert unless the
    /// aggregate repeats, and record a fresh prediction either way.
    pub async fn run_trend_cycle(&mut self) -> TrendCycleOutcome {
        let specs = self.settings.timeframes.clone();
        let windows = join_all(specs.iter().map(|spec| self.fetcher.fetch(spec))).await;

        let mut entries: Vec<(TimeframeSpec, TimeframeAnalysis)> = Vec::new();
        for (spec, window) in specs.into_iter().zip(windows) {
            let data = match window {
                Ok(data) => data,
                Err(err) => {
                    warn!(interval = %spec.interval, error = %err, "candle fetch failed, skipping timeframe");
                    continue;
                }
            };
            if data.is_empty() {
                warn!(interval = %spec.interval, "empty candle window, skipping timeframe");
                continue;
            }
            let analysis = analyze_timeframe(&data, &self.settings);
            debug!(
                interval = %spec.interval,
                label = %analysis.verdict.label,
                strength = analysis.verdict.strength,
                "timeframe analyzed"
            );
            entries.push((spec, analysis));
        }

        let report = aggregate_timeframes(
            &self.settings.symbol,
            &entries,
            &self.settings.accuracy.interval,
        );

        let suppressed = self.previous_aggregate == Some(report.aggregate);
        self.previous_aggregate = Some(report.aggregate);

        // Prediction tracking never depends on whether an alert fired.
        let displaced = self.ledger.record(Prediction {
            timestamp: report.generated_at,
            label: report.dominant,
            reference_price: report.reference_price,
        });
        if let Some(displaced) = displaced {
            debug!(label = %displaced.label, "unresolved prediction overwritten");
        }

        let notified = if suppressed {
            info!("aggregate unchanged, alert suppressed");
            false
        } else {
            self.deliver(&render_trend_message(&report)).await
        };

        TrendCycleOutcome { report, notified }
    }

    /// Resolve the outstanding prediction against the reference window's
    /// realized move. None when nothing was outstanding or the window
    /// could not be read.
    pub async fn run_accuracy_cycle(&mut self) -> Option<AccuracyReport> {
        let accuracy = self.settings.accuracy.clone();
        let spec = TimeframeSpec::new("accuracy window", &accuracy.interval, accuracy.lookback, 0);

        let data = match self.fetcher.fetch(&spec).await {
            Ok(data) => data,
            Err(err) => {
                warn!(error = %err, "accuracy window fetch failed");
                return None;
            }
        };
        if data.len() < accuracy.lookback {
            warn!(got = data.len(), want = accuracy.lookback, "accuracy window too short");
            return None;
        }

        let first = data.close[0];
        let last = data.close[data.len() - 1];
        if first == 0.0 {
            warn!("zero reference close, skipping accuracy check");
            return None;
        }
        let change_pct = (last - first) / first * 100.0;
        let actual = classify_move(change_pct, accuracy.threshold_pct);

        let report = self.ledger.resolve(actual, change_pct)?;
        info!(
            predicted = %report.prediction.label,
            actual = %report.actual,
            correct = report.correct,
            accuracy = report.stats.accuracy_percent(),
            "prediction resolved"
        );

        self.deliver(&render_accuracy_message(&report, &accuracy.interval))
            .await;
        Some(report)
    }

    /// Heartbeat for the status cadence.
    pub fn log_status(&self) {
        info!(
            symbol = %self.settings.symbol,
            resolved = self.ledger.stats().total,
            "monitoring"
        );
    }

    pub fn ledger(&self) -> &PredictionLedger {
        &self.ledger
    }

    async fn deliver(&self, message: &str) -> bool {
        match self.sink.send(message).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "alert delivery failed");
                false
            }
        }
    }
}
