//! Timeframe encoding
//!
//! A closed [`EventFrame`] is serialized into an opaque JSON payload that,
//! together with its window bounds, fully describes the timeframe to
//! downstream consumers.

use crate::eventframe::{Event, EventFrame};
use crate::timestamp::{Duration, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Wire shape of an encoded timeframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedTimeframe {
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub events: Vec<EncodedEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedEvent {
    pub offset: Duration,
    pub kind: String,
    pub data: serde_json::Value,
}

#[derive(Serialize)]
struct EncodedTimeframeRef<'a> {
    start_at: Timestamp,
    end_at: Timestamp,
    events: Vec<EncodedEventRef<'a>>,
}

#[derive(Serialize)]
struct EncodedEventRef<'a> {
    offset: Duration,
    kind: &'a str,
    data: &'a serde_json::Value,
}

pub fn encode(frame: &EventFrame) -> Result<Vec<u8>, EncodeError> {
    let payload = EncodedTimeframeRef {
        start_at: frame.start_at(),
        end_at: frame.end_at(),
        events: frame
            .events()
            .iter()
            .map(|fe| EncodedEventRef {
                offset: fe.offset,
                kind: &fe.event.kind,
                data: &fe.event.data,
            })
            .collect(),
    };

    Ok(serde_json::to_vec(&payload)?)
}

pub fn decode(data: &[u8]) -> Result<EncodedTimeframe, EncodeError> {
    Ok(serde_json::from_slice(data)?)
}

impl EncodedEvent {
    pub fn to_event(&self) -> Event {
        Event::new(self.kind.clone(), self.data.clone())
    }
}
