//! Newline-delimited JSON event feed
//!
//! Reads one [`Event`] per line from any async reader and submits it to the
//! processor. Bad lines are logged and skipped; the feed never stops the
//! processor.

use crate::eventframe::Event;
use crate::processor::Processor;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub submitted: u64,
    pub skipped: u64,
}

/// Submit every parsable line until EOF
pub async fn run_event_feed<R>(reader: R, processor: Processor) -> std::io::Result<FeedSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut summary = FeedSummary::default();
    let mut line_no = 0u64;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_event(line) {
            Ok(event) => {
                processor.submit_event(event).await;
                summary.submitted += 1;
            }
            Err(e) => {
                log::warn!("⚠️  Skipping line {}: {}", line_no, e);
                summary.skipped += 1;
            }
        }
    }

    log::info!(
        "Event feed finished: {} submitted, {} skipped",
        summary.submitted,
        summary.skipped
    );
    Ok(summary)
}

fn parse_event(line: &str) -> Result<Event, String> {
    let event: Event = serde_json::from_str(line).map_err(|e| e.to_string())?;

    if event.kind.trim().is_empty() {
        return Err("event kind is empty".to_string());
    }

    Ok(event)
}
