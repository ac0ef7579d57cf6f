//! syncstreamer runtime
//!
//! Orchestrates the timeframe service:
//! - Loads configuration from the environment (and `.env`)
//! - Starts the timeframe processor
//! - Feeds newline-delimited JSON events from stdin
//! - Periodically logs the finalized history
//!
//! Usage:
//!   cargo run --release --bin syncstreamer < events.jsonl
//!
//! Environment variables:
//!   SYNCSTREAMER_TIMEFRAME_DURATION - Timeframe duration in ms (default: 10000)
//!   SYNCSTREAMER_TIMEFRAME_HISTORY_ITEMS - History depth (default: 5)
//!   SYNCSTREAMER_CHECK_INTERVAL_MS - Liveness check interval (default: 16)
//!   SYNCSTREAMER_REPORT_INTERVAL_MS - History report interval (default: timeframe duration)
//!
//! Flags (override the environment):
//!   -timeframe_duration <ms>
//!   -timeframe_history_items <n>

use dotenv::dotenv;
use log::{error, info, warn};
use syncstreamer::{
    config::ServerConfig, feed::run_event_feed, processor::Processor, timestamp::system_clock,
};
use tokio::io::BufReader;
use tokio::sync::watch;
use tokio::time::{interval, Duration};

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = ServerConfig::from_env();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    info!("🚀 Starting syncstreamer...");
    info!("📊 Configuration:");
    info!("   ├─ RUST_LOG: {}", config.rust_log.as_deref().unwrap_or("info"));
    info!("   ├─ Timeframe duration: {}ms", config.timeframe_duration_ms);
    info!("   ├─ History items: {}", config.timeframe_history_items);
    info!("   ├─ Check interval: {}ms", config.check_interval_ms);
    info!("   └─ Report interval: {}ms", config.report_interval_ms);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (processor, mut processor_task) =
        Processor::start(config.processor_config(), system_clock(), shutdown_rx);

    // Stdin feed: ends at EOF, the processor keeps serving history afterwards
    let feed_processor = processor.clone();
    tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = run_event_feed(stdin, feed_processor).await {
            error!("❌ Event feed failed: {}", e);
        }
    });

    // History reporter
    let report_processor = processor.clone();
    let report_interval = config.report_interval_ms;
    tokio::spawn(async move {
        let mut timer = interval(Duration::from_millis(report_interval));
        loop {
            timer.tick().await;

            let history = report_processor.snapshot_history().await;
            let bytes: usize = history.iter().map(|item| item.data.len()).sum();
            match history.first() {
                Some(newest) => info!(
                    "📦 History: {} timeframes, {} bytes | newest [{}, {})",
                    history.len(),
                    bytes,
                    newest.start_at,
                    newest.end_at
                ),
                None => info!("📦 History: empty"),
            }

            if let Some(stats) = report_processor.stats().await {
                info!(
                    "📊 Accepted: {} events | rotations: {} | evictions: {}",
                    stats.events_accepted, stats.rotations, stats.evictions
                );
            }
        }
    });

    info!("🔄 Press CTRL+C to shutdown");

    tokio::select! {
        result = &mut processor_task => {
            // The processor only stops on its own after a fatal condition
            match result {
                Ok(Ok(())) => warn!("⚠️  Timeframe processor stopped unexpectedly"),
                Ok(Err(e)) => error!("❌ Fatal: {}", e),
                Err(e) => error!("❌ Timeframe processor task panicked: {}", e),
            }
            std::process::exit(1);
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                error!("❌ Failed to listen for CTRL+C: {}", err);
            }
            info!("⚠️  Received CTRL+C, shutting down...");
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = processor_task.await;

    info!("✅ syncstreamer stopped");
}
