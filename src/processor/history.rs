//! Bounded newest-first history of finalized timeframes

use crate::eventframe::EventFrame;
use crate::timeframe::{self, EncodeError};
use crate::timestamp::Timestamp;
use std::collections::VecDeque;
use std::sync::Arc;

/// Immutable record of one closed timeframe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeframeItem {
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub data: Vec<u8>,
}

impl TimeframeItem {
    /// Encode a closed frame into its history record
    pub fn from_frame(frame: &EventFrame) -> Result<Self, EncodeError> {
        let data = timeframe::encode(frame)?;

        Ok(Self {
            start_at: frame.start_at(),
            end_at: frame.end_at(),
            data,
        })
    }
}

/// Ring of at most `capacity` items, head is the most recently closed
#[derive(Debug)]
pub struct TimeframeHistory {
    items: VecDeque<Arc<TimeframeItem>>,
    capacity: usize,
}

impl TimeframeHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert at the head, evicting from the tail if full
    ///
    /// Returns the evicted item, if any.
    pub fn push(&mut self, item: TimeframeItem) -> Option<Arc<TimeframeItem>> {
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_back()
        } else {
            None
        };

        self.items.push_front(Arc::new(item));
        evicted
    }

    /// Copy of the current contents, newest first
    pub fn snapshot(&self) -> Vec<Arc<TimeframeItem>> {
        self.items.iter().cloned().collect()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
