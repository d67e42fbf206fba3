//! Alert delivery. Rendering builds plain Markdown strings from the
//! analysis reports; sinks either log them or push them to Telegram.

pub mod telegram;

use std::fmt::Write as _;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::analysis::{AccuracyReport, TrendLabel, TrendReport};

pub use self::telegram::TelegramSink;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// Sink that writes alerts to the log instead of a chat channel.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        info!(alert = %message, "notification");
        Ok(())
    }
}

fn trend_icon(label: TrendLabel) -> &'static str {
    match label {
        TrendLabel::Up => "📈",
        TrendLabel::Down => "📉",
        TrendLabel::Sideways => "⚖️",
    }
}

/// Render one trend cycle as a Markdown alert.
pub fn render_trend_message(report: &TrendReport) -> String {
    let mut msg = format!("*{} trend analysis*\n\n", report.symbol);

    for tf in &report.timeframes {
        let _ = writeln!(
            msg,
            "*-- {} {} (weight {})*",
            tf.name,
            trend_icon(tf.label),
            tf.weight
        );
        let _ = writeln!(
            msg,
            "• verdict: *{}* (strength {:.1}%)",
            tf.label, tf.strength
        );
    }

    if let Some(reference) = &report.reference {
        msg.push_str("\n*Reference window detail*\n");
        if let Some(rsi) = reference.snapshot.rsi {
            let zone = if rsi > 70.0 {
                "overbought"
            } else if rsi < 30.0 {
                "oversold"
            } else {
                "neutral"
            };
            let _ = writeln!(msg, "• RSI: {rsi:.2} ({zone})");
        }
        if let Some(cross) = reference.snapshot.ma_cross {
            if cross.slow != 0.0 {
                let diff_pct = (cross.fast - cross.slow).abs() / cross.slow * 100.0;
                if diff_pct < 1.0 {
                    let side = if cross.fast >= cross.slow {
                        "golden"
                    } else {
                        "death"
                    };
                    let _ = writeln!(msg, "• MA cross: *{side} cross near* ({diff_pct:.2}% apart)");
                }
            }
        }
        if !reference.harmonic.is_empty() {
            let names: Vec<&str> = reference
                .harmonic
                .iter()
                .map(|h| h.pattern.name())
                .collect();
            let _ = writeln!(msg, "• harmonic: {}", names.join(", "));
        }
        if let Some(ichimoku) = &reference.ichimoku {
            let _ = writeln!(msg, "• ichimoku: {:?}", ichimoku.trend);
        }
        let _ = writeln!(msg, "• wave pattern: {:?}", reference.elliott.pattern);
    }

    let _ = write!(msg, "\n*Overall {} *\n", trend_icon(report.dominant));
    let max = report
        .aggregate
        .up
        .max(report.aggregate.down)
        .max(report.aggregate.sideways);
    for label in TrendLabel::PRIORITY {
        let score = report.aggregate.get(label);
        let star = if score == max { " ⭐️" } else { "" };
        let _ = writeln!(msg, "{} {}: *{}{}*", trend_icon(label), label, score, star);
    }

    msg
}

/// Render one accuracy resolution as a Markdown alert.
pub fn render_accuracy_message(report: &AccuracyReport, interval: &str) -> String {
    let mut msg = format!("*Prediction accuracy ({interval})*\n");
    let _ = writeln!(msg, "• predicted: {}", report.prediction.label);
    let _ = writeln!(msg, "• actual: {}", report.actual);
    let _ = writeln!(msg, "• price change: {:.2}%", report.price_change_pct);
    let _ = writeln!(
        msg,
        "• result: {}",
        if report.correct { "✅ correct" } else { "❌ incorrect" }
    );
    msg.push_str("\n*Cumulative*\n");
    let _ = writeln!(msg, "• total: {}", report.stats.total);
    let _ = writeln!(msg, "• correct: {}", report.stats.correct);
    let _ = writeln!(msg, "• incorrect: {}", report.stats.incorrect);
    let _ = writeln!(msg, "• accuracy: {}%", report.stats.accuracy_percent());
    msg
}
