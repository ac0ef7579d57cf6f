//! Processor tuning knobs

use crate::timestamp::Duration;

pub const DEFAULT_TIMEFRAME_DURATION_MS: i64 = 10_000;
pub const DEFAULT_TIMEFRAME_HISTORY_ITEMS: usize = 5;
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 16;

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Length of one timeframe window
    pub timeframe_duration: Duration,

    /// Number of finalized timeframes kept in history
    pub history_items: usize,

    /// How often the actor checks for an elapsed window without traffic
    ///
    /// Must stay well below `timeframe_duration`.
    pub check_interval: std::time::Duration,
}

impl ProcessorConfig {
    /// Build a config, substituting defaults for zero values
    pub fn new(timeframe_duration_ms: i64, history_items: usize) -> Self {
        let timeframe_duration_ms = if timeframe_duration_ms <= 0 {
            DEFAULT_TIMEFRAME_DURATION_MS
        } else {
            timeframe_duration_ms
        };

        let history_items = if history_items == 0 {
            DEFAULT_TIMEFRAME_HISTORY_ITEMS
        } else {
            history_items
        };

        Self {
            timeframe_duration: Duration::from_millis(timeframe_duration_ms),
            history_items,
            check_interval: std::time::Duration::from_millis(DEFAULT_CHECK_INTERVAL_MS),
        }
    }

    pub fn with_check_interval(mut self, check_interval: std::time::Duration) -> Self {
        if !check_interval.is_zero() {
            self.check_interval = check_interval;
        }
        self
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEFRAME_DURATION_MS, DEFAULT_TIMEFRAME_HISTORY_ITEMS)
    }
}
