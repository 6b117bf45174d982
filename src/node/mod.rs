//! Search nodes and their inherited temperature.
//!
//! A node is a box plus its depth in the bisection tree and a decaying
//! "temperature" that biases exploration order. The decay parameters live
//! in an explicit [`TemperatureSchedule`] handed to whoever splits nodes.

mod config;
mod types;

pub use config::{adaptive_k, Randomization, TemperatureSchedule, ADAPTIVE_ALPHA, ADAPTIVE_EPS};
pub use types::Node;
