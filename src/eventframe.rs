//! Event frame - accumulator for the currently open timeframe window
//!
//! A frame covers the half-open window `[start_at, end_at)`. Events are
//! stamped with their offset from `start_at` at the moment they are added.

use crate::timestamp::{Clock, Duration, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque producer event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Event {
    pub fn new(kind: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.data)
    }
}

/// Event as recorded inside a frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameEvent {
    /// Milliseconds since the frame's `start_at`
    pub offset: Duration,
    pub event: Event,
}

/// Rejection from [`EventFrame::add_event_at`]
///
/// The rejected event is handed back so the caller can retry it elsewhere.
#[derive(Debug, Error, PartialEq)]
pub enum EventFrameError {
    #[error("event at {at} is outside timeframe [{start_at}, {end_at})")]
    OutOfTimeframe {
        event: Event,
        at: Timestamp,
        start_at: Timestamp,
        end_at: Timestamp,
    },

    #[error("invalid event ({reason}): {event}")]
    InvalidEvent { event: Event, reason: String },
}

impl EventFrameError {
    pub fn is_out_of_timeframe(&self) -> bool {
        matches!(self, EventFrameError::OutOfTimeframe { .. })
    }

    pub fn event(&self) -> &Event {
        match self {
            EventFrameError::OutOfTimeframe { event, .. } => event,
            EventFrameError::InvalidEvent { event, .. } => event,
        }
    }

    pub fn into_event(self) -> Event {
        match self {
            EventFrameError::OutOfTimeframe { event, .. } => event,
            EventFrameError::InvalidEvent { event, .. } => event,
        }
    }
}

pub struct EventFrame {
    start_at: Timestamp,
    end_at: Timestamp,
    events: Vec<FrameEvent>,
    clock: Clock,
}

impl EventFrame {
    /// Open a frame covering `[now, now + duration)` on the given clock
    pub fn start(duration: Duration, clock: Clock) -> Self {
        let start_at = clock();
        Self {
            start_at,
            end_at: start_at + duration,
            events: Vec::new(),
            clock,
        }
    }

    pub fn start_at(&self) -> Timestamp {
        self.start_at
    }

    pub fn end_at(&self) -> Timestamp {
        self.end_at
    }

    pub fn events(&self) -> &[FrameEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.start_at <= now && now < self.end_at
    }

    /// True while the frame's clock still reads inside the window
    pub fn is_active(&self) -> bool {
        self.is_active_at((self.clock)())
    }

    pub fn add_event_at(&mut self, event: Event, now: Timestamp) -> Result<(), EventFrameError> {
        if !self.is_active_at(now) {
            return Err(EventFrameError::OutOfTimeframe {
                event,
                at: now,
                start_at: self.start_at,
                end_at: self.end_at,
            });
        }

        if event.kind.trim().is_empty() {
            return Err(EventFrameError::InvalidEvent {
                event,
                reason: "event kind is empty".to_string(),
            });
        }

        self.events.push(FrameEvent {
            offset: now - self.start_at,
            event,
        });
        Ok(())
    }

    pub fn add_event_now(&mut self, event: Event) -> Result<(), EventFrameError> {
        let now = (self.clock)();
        self.add_event_at(event, now)
    }
}

impl fmt::Debug for EventFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFrame")
            .field("start_at", &self.start_at)
            .field("end_at", &self.end_at)
            .field("events", &self.events.len())
            .finish()
    }
}
