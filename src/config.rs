use crate::processor::config::{
    ProcessorConfig, DEFAULT_CHECK_INTERVAL_MS, DEFAULT_TIMEFRAME_DURATION_MS,
    DEFAULT_TIMEFRAME_HISTORY_ITEMS,
};
use std::env;

/// Configuration loaded from environment variables and command-line flags
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Timeframe duration in milliseconds
    pub timeframe_duration_ms: i64,

    /// Number of finalized timeframes kept in history
    pub timeframe_history_items: usize,

    /// Liveness check interval in milliseconds
    pub check_interval_ms: u64,

    /// How often the runtime logs a history summary, in milliseconds
    pub report_interval_ms: u64,

    pub rust_log: Option<String>,
}

/// Environment keys for the timeframe duration, preferred name first
const TIMEFRAME_DURATION_KEYS: [&str; 2] = [
    "SYNCSTREAMER_TIMEFRAME_DURATION",
    "SYNCSTREAME_TIMEFRAME_DURATION",
];

/// Environment keys for the history depth, preferred name first
const TIMEFRAME_HISTORY_ITEMS_KEYS: [&str; 2] = [
    "SYNCSTREAMER_TIMEFRAME_HISTORY_ITEMS",
    "SYNCSTREAM_TIMEFRAME_HISTORY_ITEMS",
];

impl ServerConfig {
    /// Load configuration from environment variables and command-line flags
    ///
    /// Environment variables:
    /// - `SYNCSTREAMER_TIMEFRAME_DURATION` (default: 10000)
    /// - `SYNCSTREAMER_TIMEFRAME_HISTORY_ITEMS` (default: 5)
    /// - `SYNCSTREAMER_CHECK_INTERVAL_MS` (default: 16)
    /// - `SYNCSTREAMER_REPORT_INTERVAL_MS` (default: timeframe duration)
    ///
    /// The legacy spellings `SYNCSTREAME_TIMEFRAME_DURATION` and
    /// `SYNCSTREAM_TIMEFRAME_HISTORY_ITEMS` are still read when the new
    /// names are unset.
    ///
    /// Flags `-timeframe_duration <ms>` and `-timeframe_history_items <n>`
    /// (one or two dashes, `=value` also accepted) override the environment.
    ///
    /// Unset, unparsable or zero values fall back to the default.
    pub fn from_env() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::from_sources(|key| env::var(key).ok(), &args)
    }

    /// Environment-only view, used where no command line applies
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_sources(lookup, &[])
    }

    pub fn from_sources<F>(lookup: F, args: &[String]) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_of = |keys: &[&str]| keys.iter().find_map(|key| lookup(key));

        let timeframe_duration_ms = flag_value(args, "timeframe_duration")
            .map(str::to_string)
            .or_else(|| first_of(&TIMEFRAME_DURATION_KEYS))
            .and_then(|s| parse_positive(&s))
            .and_then(|v| i64::try_from(v).ok())
            .unwrap_or(DEFAULT_TIMEFRAME_DURATION_MS);

        let timeframe_history_items = flag_value(args, "timeframe_history_items")
            .map(str::to_string)
            .or_else(|| first_of(&TIMEFRAME_HISTORY_ITEMS_KEYS))
            .and_then(|s| parse_positive(&s))
            .map(|v| v as usize)
            .unwrap_or(DEFAULT_TIMEFRAME_HISTORY_ITEMS);

        let check_interval_ms = lookup("SYNCSTREAMER_CHECK_INTERVAL_MS")
            .and_then(|s| parse_positive(&s))
            .unwrap_or(DEFAULT_CHECK_INTERVAL_MS);

        let report_interval_ms = lookup("SYNCSTREAMER_REPORT_INTERVAL_MS")
            .and_then(|s| parse_positive(&s))
            .unwrap_or(timeframe_duration_ms as u64);

        Self {
            timeframe_duration_ms,
            timeframe_history_items,
            check_interval_ms,
            report_interval_ms,
            rust_log: lookup("RUST_LOG"),
        }
    }

    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig::new(self.timeframe_duration_ms, self.timeframe_history_items)
            .with_check_interval(std::time::Duration::from_millis(self.check_interval_ms))
    }
}

fn parse_positive(s: &str) -> Option<u64> {
    s.trim().parse::<u64>().ok().filter(|v| *v > 0)
}

/// Value of `-name value`, `--name value` or `-name=value`; the last occurrence wins
fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter().enumerate().rev().find_map(|(idx, arg)| {
        if !arg.starts_with('-') {
            return None;
        }

        let flag = arg.trim_start_matches('-');
        if flag == name {
            return args.get(idx + 1).map(|s| s.as_str());
        }
        flag.strip_prefix(name).and_then(|rest| rest.strip_prefix('='))
    })
}
