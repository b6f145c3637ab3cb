//! Refresh scheduling.
//!
//! [`gate::RefreshGate`] guarantees at most one refresh cycle in flight and
//! lets late callers join it; [`engine::RefreshScheduler`] drives the gate
//! from a [`ticker::Ticker`].

pub mod engine;
pub mod gate;
pub mod state;
pub mod ticker;
pub mod types;

pub use engine::RefreshScheduler;
pub use gate::{CycleHandle, CycleResult, RefreshGate};
pub use state::{CycleState, SchedulerStats};
pub use ticker::{ChannelTicker, IntervalTicker, Ticker};
pub use types::SchedulerConfig;
