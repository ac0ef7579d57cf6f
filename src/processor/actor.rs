//! Processor actor - single task owning all timeframe state
//!
//! Producers and readers never touch [`ProcessorState`] directly. Each call on
//! [`Processor`] becomes a message on a capacity-1 mpsc channel, so callers
//! wait for the actor instead of racing ahead of it. The loop multiplexes:
//! 1. Incoming events and queries
//! 2. A short periodic tick that closes elapsed frames without traffic
//! 3. A watch-based shutdown signal (abrupt stop, no drain)
//!
//! A fatal condition ends the loop and is returned from the task's
//! `JoinHandle`; the process entry point is expected to terminate on it.

use super::config::ProcessorConfig;
use super::history::TimeframeItem;
use super::state::{ProcessorState, ProcessorStats};
use crate::error::ProcessorResult;
use crate::eventframe::Event;
use crate::timestamp::Clock;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

enum ProcessorMessage {
    Event(Event),
    Snapshot(oneshot::Sender<Vec<Arc<TimeframeItem>>>),
    Stats(oneshot::Sender<ProcessorStats>),
}

/// Cloneable handle to a running processor
#[derive(Clone)]
pub struct Processor {
    tx: mpsc::Sender<ProcessorMessage>,
}

impl Processor {
    /// Spawn the processor loop on the current tokio runtime
    ///
    /// The loop stops when `shutdown` flips to true, when its sender is
    /// dropped, or when every `Processor` handle has been dropped.
    pub fn start(
        config: ProcessorConfig,
        clock: Clock,
        shutdown: watch::Receiver<bool>,
    ) -> (Self, JoinHandle<ProcessorResult<()>>) {
        let (tx, rx) = mpsc::channel(1);
        let check_interval = config.check_interval;
        let state = ProcessorState::new(config, clock);

        let task = tokio::spawn(run_processor(state, rx, shutdown, check_interval));

        (Self { tx }, task)
    }

    /// Hand an event to the processor
    ///
    /// Fire-and-forget: boundary crossings are resolved inside the actor and
    /// nothing is reported back.
    pub async fn submit_event(&self, event: Event) {
        if let Err(e) = self.tx.send(ProcessorMessage::Event(event)).await {
            log::warn!("Processor stopped, dropping event: {}", e.0.describe());
        }
    }

    /// Finalized timeframes, newest first
    pub async fn snapshot_history(&self) -> Vec<Arc<TimeframeItem>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        if self.tx.send(ProcessorMessage::Snapshot(reply_tx)).await.is_err() {
            log::warn!("Processor stopped, returning empty history");
            return Vec::new();
        }

        reply_rx.await.unwrap_or_else(|_| {
            log::warn!("Processor stopped before answering history request");
            Vec::new()
        })
    }

    pub async fn stats(&self) -> Option<ProcessorStats> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send(ProcessorMessage::Stats(reply_tx)).await.ok()?;
        reply_rx.await.ok()
    }
}

impl ProcessorMessage {
    fn describe(&self) -> String {
        match self {
            ProcessorMessage::Event(event) => event.to_string(),
            ProcessorMessage::Snapshot(_) => "history request".to_string(),
            ProcessorMessage::Stats(_) => "stats request".to_string(),
        }
    }
}

async fn run_processor(
    mut state: ProcessorState,
    mut rx: mpsc::Receiver<ProcessorMessage>,
    mut shutdown: watch::Receiver<bool>,
    check_interval: std::time::Duration,
) -> ProcessorResult<()> {
    log::info!(
        "⏱️  Timeframe processor started (check interval: {}ms)",
        check_interval.as_millis()
    );

    let mut checker = interval(check_interval);
    checker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            message = rx.recv() => {
                match message {
                    Some(ProcessorMessage::Event(event)) => {
                        if let Err(e) = state.submit(event) {
                            log::error!("❌ Timeframe processor failed: {}", e);
                            return Err(e);
                        }
                    }
                    Some(ProcessorMessage::Snapshot(reply)) => {
                        let _ = reply.send(state.snapshot());
                    }
                    Some(ProcessorMessage::Stats(reply)) => {
                        let _ = reply.send(state.stats());
                    }
                    None => {
                        log::info!("All processor handles dropped, stopping");
                        return Ok(());
                    }
                }
            }

            _ = checker.tick() => {
                if let Err(e) = state.check_elapsed() {
                    log::error!("❌ Timeframe processor failed: {}", e);
                    return Err(e);
                }
            }

            // Resolves at once when the receiver already holds `true`
            _ = shutdown.wait_for(|stop| *stop) => {
                log::info!("Timeframe processor received shutdown signal");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessorError;
    use crate::timestamp::{Duration, ManualClock, Timestamp};
    use serde_json::json;
    use tokio::time::{sleep, timeout};

    fn start(
        duration: i64,
        history_items: usize,
    ) -> (
        ManualClock,
        watch::Sender<bool>,
        Processor,
        JoinHandle<ProcessorResult<()>>,
    ) {
        let clock = ManualClock::new(Timestamp(0));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let config = ProcessorConfig::new(duration, history_items);
        let (processor, task) = Processor::start(config, clock.clock(), shutdown_rx);
        (clock, shutdown_tx, processor, task)
    }

    #[tokio::test]
    async fn test_submit_then_snapshot_observes_event() {
        let (clock, _shutdown, processor, _task) = start(100, 2);

        processor.submit_event(Event::new("a", json!(1))).await;
        processor.stats().await.unwrap();
        clock.set(Timestamp(100));
        processor.submit_event(Event::new("b", json!(2))).await;

        let history = processor.snapshot_history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].start_at, Timestamp(0));
        assert_eq!(history[0].end_at, Timestamp(100));
    }

    #[tokio::test]
    async fn test_ticker_closes_idle_frame() {
        let (clock, _shutdown, processor, _task) = start(100, 2);

        clock.advance(Duration(150));
        sleep(std::time::Duration::from_millis(100)).await;

        let history = processor.snapshot_history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(processor.stats().await.unwrap().rotations, 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_loop() {
        let (_clock, shutdown, processor, task) = start(100, 2);

        shutdown.send(true).unwrap();
        let result = timeout(std::time::Duration::from_secs(1), task)
            .await
            .expect("processor did not stop")
            .unwrap();
        assert!(result.is_ok());

        // Handles keep working, they just see an empty history
        assert!(processor.snapshot_history().await.is_empty());
        assert!(processor.stats().await.is_none());
        processor.submit_event(Event::new("late", json!(null))).await;
    }

    #[tokio::test]
    async fn test_shutdown_already_signalled_before_start() {
        let clock = ManualClock::new(Timestamp(0));
        let (shutdown_tx, _initial_rx) = watch::channel(false);
        shutdown_tx.send(true).unwrap();

        let (_processor, task) = Processor::start(
            ProcessorConfig::new(100, 2),
            clock.clock(),
            shutdown_tx.subscribe(),
        );

        let result = timeout(std::time::Duration::from_millis(500), task)
            .await
            .expect("processor did not stop")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_event_ends_task_with_error() {
        let (_clock, _shutdown, processor, task) = start(100, 2);

        processor.submit_event(Event::new("", json!(null))).await;

        let result = timeout(std::time::Duration::from_secs(1), task)
            .await
            .expect("processor did not stop")
            .unwrap();
        assert!(matches!(result, Err(ProcessorError::RejectedEvent(_))));
    }

    #[tokio::test]
    async fn test_dropping_all_handles_stops_loop() {
        let (_clock, _shutdown, processor, task) = start(100, 2);

        drop(processor);
        let result = timeout(std::time::Duration::from_secs(1), task)
            .await
            .expect("processor did not stop")
            .unwrap();
        assert!(result.is_ok());
    }
}
