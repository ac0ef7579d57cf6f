//! # syncstreamer
//!
//! Ingestion core of a live event-distribution service. Producers push
//! events; they are grouped into fixed-duration timeframes by a single
//! serialized processor task, and the most recent finalized timeframes are
//! served to readers on demand.
//!
//! ## Module Organization
//!
//! - `timestamp` - Millisecond instants, durations, injectable clock
//! - `eventframe` - Open timeframe accumulator
//! - `timeframe` - Encoding of closed frames
//! - `processor` - The timeframe actor, its state machine and history
//! - `config` - Environment-driven configuration
//! - `feed` - JSONL event ingestion


pub mod config;
pub mod error;
pub mod eventframe;
pub mod feed;
pub mod processor;
pub mod timeframe;
pub mod timestamp;

pub use config::ServerConfig;
pub use error::{ProcessorError, ProcessorResult};
pub use eventframe::{Event, EventFrame, EventFrameError};
pub use processor::{Processor, ProcessorConfig, ProcessorStats, TimeframeItem};
pub use timestamp::{Clock, Duration, Timestamp};
