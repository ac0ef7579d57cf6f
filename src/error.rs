//! Unrecoverable processor conditions
//!
//! Window-boundary rejections never reach this type; they are absorbed by
//! rotating frames. Anything that does end up here stops the processor.

use crate::eventframe::{Event, EventFrameError};
use crate::timeframe::EncodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("failed to encode timeframe: {0}")]
    Encode(#[from] EncodeError),

    #[error("event rejected: {0}")]
    RejectedEvent(#[source] EventFrameError),

    #[error("event still out of timeframe after {rotations} rotations, the event {event}")]
    RotationLimit { event: Event, rotations: usize },
}

pub type ProcessorResult<T> = Result<T, ProcessorError>;
