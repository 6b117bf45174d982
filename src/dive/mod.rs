//! Feasible diving.
//!
//! A dive is a greedy depth-first descent through the bisection tree of a
//! box: contract, harvest an upper bound, split the widest dimension, keep
//! the child with the better thermal score, repeat. It never backtracks,
//! so it is cheap enough to run from every node of a branch-and-bound
//! search as a primal heuristic.
//!
//! Three stopping policies are available through [`SelectionPolicy`]:
//! precision only, a soft depth budget, and a relative-volume cutoff.

mod config;
mod runner;

pub use config::{DiveConfig, SelectionPolicy};
pub use runner::{volume_cutoff_reached, DiveOutcome, DiveRunner, DiveStop};

pub(crate) use runner::dive;
