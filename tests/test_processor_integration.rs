//! Integration tests for the timeframe processor
//!
//! Tests drive the public `Processor` handle through a real tokio runtime:
//! - Many producers sharing one handle
//! - Snapshot coherence while producers are active
//! - Liveness of the periodic check without traffic
//! - Bounded history under sustained rotation
//! - Shutdown and fatal-error signalling

#[cfg(test)]
mod processor_integration_tests {
    use serde_json::json;
    use syncstreamer::{
        processor::{Processor, ProcessorConfig},
        timeframe,
        timestamp::{Duration, ManualClock, Timestamp},
        Event, ProcessorError,
    };
    use tokio::sync::watch;
    use tokio::time::{sleep, timeout};

    fn start_processor(
        duration_ms: i64,
        history_items: usize,
    ) -> (
        ManualClock,
        watch::Sender<bool>,
        Processor,
        tokio::task::JoinHandle<Result<(), ProcessorError>>,
    ) {
        let clock = ManualClock::new(Timestamp(1_700_000_000_000));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (processor, task) = Processor::start(
            ProcessorConfig::new(duration_ms, history_items),
            clock.clock(),
            shutdown_rx,
        );
        (clock, shutdown_tx, processor, task)
    }

    async fn total_events(processor: &Processor) -> usize {
        processor
            .snapshot_history()
            .await
            .iter()
            .map(|item| timeframe::decode(&item.data).unwrap().events.len())
            .sum()
    }

    #[tokio::test]
    async fn test_multiple_producers_no_event_lost() {
        // Test: 4 producers x 25 events all land in the same open frame
        let (clock, _shutdown, processor, _task) = start_processor(1_000, 5);

        let mut producers = Vec::new();
        for p in 0..4 {
            let handle = processor.clone();
            producers.push(tokio::spawn(async move {
                for i in 0..25 {
                    handle
                        .submit_event(Event::new(format!("producer_{}", p), json!(i)))
                        .await;
                }
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }

        // All producer events handled before the window moves
        assert_eq!(processor.stats().await.unwrap().events_accepted, 100);

        // Close the frame and count what it held
        clock.advance(Duration(1_000));
        processor.submit_event(Event::new("closer", json!(null))).await;

        assert_eq!(total_events(&processor).await, 100);
        assert_eq!(processor.stats().await.unwrap().events_accepted, 101);
    }

    #[tokio::test]
    async fn test_liveness_without_traffic() {
        // Test: an idle window still closes via the periodic check
        let (clock, _shutdown, processor, _task) = start_processor(100, 5);

        for expected in 1..=3usize {
            clock.advance(Duration(100));
            sleep(std::time::Duration::from_millis(80)).await;
            assert_eq!(processor.snapshot_history().await.len(), expected);
        }
    }

    #[tokio::test]
    async fn test_history_bounded_under_rotation() {
        // Test: H + m closures keep exactly the H most recent frames
        let (clock, _shutdown, processor, _task) = start_processor(100, 3);
        let start = clock.now();

        for _ in 0..7 {
            clock.advance(Duration(100));
            processor.submit_event(Event::new("tick", json!(null))).await;
            assert!(processor.snapshot_history().await.len() <= 3);
        }

        let history = processor.snapshot_history().await;
        let starts: Vec<i64> = history
            .iter()
            .map(|item| (item.start_at - start).as_millis())
            .collect();
        assert_eq!(starts, vec![600, 500, 400]);
    }

    #[tokio::test]
    async fn test_snapshot_is_stable_without_changes() {
        // Test: two reads with nothing in between are identical
        let (clock, _shutdown, processor, _task) = start_processor(100, 3);

        clock.advance(Duration(100));
        processor.submit_event(Event::new("a", json!(1))).await;

        let first = processor.snapshot_history().await;
        let second = processor.snapshot_history().await;
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_signal_stops_processor() {
        // Test: shutdown ends the loop cleanly and later calls degrade to no-ops
        let (_clock, shutdown, processor, task) = start_processor(100, 3);

        shutdown.send(true).unwrap();
        let result = timeout(std::time::Duration::from_secs(1), task)
            .await
            .expect("processor did not stop")
            .unwrap();
        assert!(result.is_ok());

        processor.submit_event(Event::new("after", json!(null))).await;
        assert!(processor.snapshot_history().await.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_set_before_start_stops_processor() {
        // Test: a receiver subscribed after shutdown was signalled still stops the loop
        let clock = ManualClock::new(Timestamp(0));
        let (shutdown_tx, _initial_rx) = watch::channel(false);
        shutdown_tx.send(true).unwrap();

        let (_processor, task) = Processor::start(
            ProcessorConfig::new(100, 3),
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
    async fn test_malformed_event_is_fatal() {
        // Test: a non-boundary rejection surfaces from the task with the event attached
        let (_clock, _shutdown, processor, task) = start_processor(100, 3);

        processor.submit_event(Event::new("", json!({"bad": true}))).await;

        let result = timeout(std::time::Duration::from_secs(1), task)
            .await
            .expect("processor did not stop")
            .unwrap();
        match result {
            Err(ProcessorError::RejectedEvent(source)) => {
                assert_eq!(source.event().data, json!({"bad": true}));
            }
            other => panic!("expected RejectedEvent, got {:?}", other),
        }
    }
}
