//! Best-first branch and bound over the priority buffer.
//!
//! A compact optimizer loop in the style of interval global solvers: it
//! maintains the incumbent `loup` and the certified lower bound `uplo`,
//! and stops once the two are within `abs_eps_f`, when the buffer runs
//! dry, or on a node or time budget.

mod config;
mod runner;

pub use config::BestFirstConfig;
pub use runner::{BestFirstOutcome, BestFirstRunner, BestFirstStatus};
