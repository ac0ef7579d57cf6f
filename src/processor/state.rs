//! Processor state machine
//!
//! Synchronous core owned by the actor task: one open [`EventFrame`] plus the
//! bounded [`TimeframeHistory`]. Nothing in here is shared; the actor in
//! `actor.rs` is the only caller.

use super::config::ProcessorConfig;
use super::history::{TimeframeHistory, TimeframeItem};
use crate::error::{ProcessorError, ProcessorResult};
use crate::eventframe::{Event, EventFrame, EventFrameError};
use crate::timestamp::Clock;
use std::sync::Arc;

/// Upper bound on rotations a single event may trigger
///
/// A fresh frame starts at "now", so one rotation always suffices unless the
/// clock jumps by more than a whole timeframe between rotate and retry.
pub const MAX_ROTATIONS_PER_EVENT: usize = 3;

/// Counters reported by [`ProcessorState::stats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    pub events_accepted: u64,
    pub rotations: u64,
    pub evictions: u64,
    pub history_len: usize,
}

pub struct ProcessorState {
    config: ProcessorConfig,
    clock: Clock,
    current: EventFrame,
    history: TimeframeHistory,
    events_accepted: u64,
    rotations: u64,
    evictions: u64,
}

impl ProcessorState {
    pub fn new(config: ProcessorConfig, clock: Clock) -> Self {
        let current = start_new_eventframe(&config, &clock);
        let history = TimeframeHistory::new(config.history_items);

        Self {
            config,
            clock,
            current,
            history,
            events_accepted: 0,
            rotations: 0,
            evictions: 0,
        }
    }

    /// Add an event to the open frame, rotating on window-boundary rejections
    pub fn submit(&mut self, mut event: Event) -> ProcessorResult<()> {
        let mut rotations = 0;

        loop {
            match self.current.add_event_now(event) {
                Ok(()) => {
                    self.events_accepted += 1;
                    return Ok(());
                }
                Err(EventFrameError::OutOfTimeframe { event: rejected, .. }) => {
                    if rotations == MAX_ROTATIONS_PER_EVENT {
                        return Err(ProcessorError::RotationLimit {
                            event: rejected,
                            rotations,
                        });
                    }
                    self.rotate()?;
                    rotations += 1;
                    event = rejected;
                }
                Err(e) => return Err(ProcessorError::RejectedEvent(e)),
            }
        }
    }

    /// Close the open frame if its window has elapsed
    ///
    /// Returns true when a rotation happened.
    pub fn check_elapsed(&mut self) -> ProcessorResult<bool> {
        if self.current.is_active() {
            return Ok(false);
        }

        self.rotate()?;
        Ok(true)
    }

    /// Finalize the open frame into history and open a fresh one
    pub fn rotate(&mut self) -> ProcessorResult<()> {
        let item = TimeframeItem::from_frame(&self.current)?;

        log::debug!(
            "Closing timeframe [{}, {}) with {} events ({} bytes)",
            item.start_at,
            item.end_at,
            self.current.len(),
            item.data.len()
        );

        if let Some(evicted) = self.history.push(item) {
            self.evictions += 1;
            log::debug!("Evicted timeframe [{}, {})", evicted.start_at, evicted.end_at);
        }

        self.current = start_new_eventframe(&self.config, &self.clock);
        self.rotations += 1;
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<Arc<TimeframeItem>> {
        self.history.snapshot()
    }

    pub fn current(&self) -> &EventFrame {
        &self.current
    }

    pub fn stats(&self) -> ProcessorStats {
        ProcessorStats {
            events_accepted: self.events_accepted,
            rotations: self.rotations,
            evictions: self.evictions,
            history_len: self.history.len(),
        }
    }
}

fn start_new_eventframe(config: &ProcessorConfig, clock: &Clock) -> EventFrame {
    let frame = EventFrame::start(config.timeframe_duration, clock.clone());
    log::debug!("Start new timeframe [{}, {})", frame.start_at(), frame.end_at());
    frame
}
