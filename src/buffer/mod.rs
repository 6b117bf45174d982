//! Priority node buffer for best-first branch and bound.
//!
//! [`TempBuffer`] orders pending nodes by their objective lower bound with
//! a small thermal tie-break, while reporting the exact smallest lower
//! bound through a separate heap. Optional depth and volume cutoffs feed
//! diagnostic [`TriggerCounts`] without affecting the order.

mod config;
mod heap;
mod temp;

pub use config::BufferConfig;
pub use temp::{TempBuffer, TriggerCounts};
