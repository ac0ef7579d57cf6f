//! Timeframe processor
//!
//! Groups incoming events into fixed-duration timeframes and keeps the most
//! recent finalized ones for readers.
//!
//! ```text
//! submit_event ──┐
//! snapshot ──────┼─► mpsc (cap 1) ─► actor loop ─► ProcessorState
//! ticker (16ms) ─┤                                 ├─ EventFrame (open)
//! shutdown ──────┘                                 └─ TimeframeHistory (≤ H)
//! ```

pub mod actor;
pub mod config;
pub mod history;
pub mod state;

pub use actor::Processor;
pub use config::ProcessorConfig;
pub use history::{TimeframeHistory, TimeframeItem};
pub use state::{ProcessorState, ProcessorStats, MAX_ROTATIONS_PER_EVENT};
