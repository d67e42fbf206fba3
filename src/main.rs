// src/main.rs
use anyhow::Result;
use clap::Parser;
use tokio::time::{interval, interval_at, Duration, Instant, MissedTickBehavior};
use tracing::info;

use trend_monitor::cli::{Cli, Commands};
use trend_monitor::config::Settings;
use trend_monitor::market::OkxClient;
use trend_monitor::monitor::MonitorSession;
use trend_monitor::notify::{render_trend_message, LogSink, NotificationSink, TelegramSink};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(symbol) = cli.symbol {
        settings.symbol = symbol;
    }

    let fetcher = Box::new(OkxClient::new(&settings.base_url, &settings.symbol));
    let sink: Box<dyn NotificationSink> = match &settings.telegram {
        Some(telegram) => Box::new(TelegramSink::new(telegram)),
        None => Box::new(LogSink),
    };

    let mut session = MonitorSession::new(settings.clone(), fetcher, sink);

    match cli.command {
        Commands::Once { json } => {
            let outcome = session.run_trend_cycle().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.report)?);
            } else {
                println!("{}", render_trend_message(&outcome.report));
            }
        }
        Commands::Run => {
            run_loop(&mut session, &settings).await;
        }
    }

    Ok(())
}

/// Drive the three cadences from a single task so cycles never overlap.
async fn run_loop(session: &mut MonitorSession, settings: &Settings) {
    let schedule = settings.schedule;
    info!(
        symbol = %settings.symbol,
        trend_secs = schedule.trend_secs,
        accuracy_secs = schedule.accuracy_secs,
        "starting monitor loop"
    );

    // The trend cadence fires immediately; the others wait a full period.
    let mut trend = interval(Duration::from_secs(schedule.trend_secs));
    let mut accuracy = interval_at(
        Instant::now() + Duration::from_secs(schedule.accuracy_secs),
        Duration::from_secs(schedule.accuracy_secs),
    );
    let mut status = interval_at(
        Instant::now() + Duration::from_secs(schedule.status_secs),
        Duration::from_secs(schedule.status_secs),
    );
    trend.set_missed_tick_behavior(MissedTickBehavior::Delay);
    accuracy.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = trend.tick() => {
                session.run_trend_cycle().await;
            }
            _ = accuracy.tick() => {
                session.run_accuracy_cycle().await;
            }
            _ = status.tick() => {
                session.log_status();
            }
        }
    }
}
