//! Feasible diving and temperature-biased branch-and-bound over interval boxes.
//!
//! Provides the search core of an interval global optimizer:
//!
//! - **Diving**: a single greedy, non-backtracking descent that bisects the
//!   widest dimension and follows the better-scoring child, harvesting
//!   upper bounds along the way. Optional depth-budget pacing or
//!   relative-volume cutoffs.
//! - **Stack B&B**: a depth-first branch-and-bound that launches a dive
//!   from every processed node and prunes by lower bound against the
//!   shared incumbent.
//! - **Priority buffer**: a best-first node buffer ordered by a
//!   temperature-biased score, with an exact lower-bound minimum, bulk
//!   pruning on incumbent improvement and cutoff trigger counters.
//! - **Best-first optimizer**: a compact loop over the buffer that
//!   brackets the optimum between `uplo` and `loup`.
//! - **Experiment harness**: the ten named variants, seeded repeated runs
//!   (optionally parallel) and a CSV result log.
//!
//! # Architecture
//!
//! The constraint system and objective are opaque: everything is driven
//! through the [`problem::BoxProblem`] trait (contract a box, enclose the
//! objective, evaluate a point). Temperatures are inherited through an
//! explicit [`node::TemperatureSchedule`]; there is no global state.
//! Configuration mistakes are the only errors ([`FdError`]); empty boxes,
//! non-finite values and exhausted budgets are reported in the outcomes.

pub mod bestfirst;
pub mod bnb;
pub mod buffer;
pub mod dive;
pub mod error;
pub mod experiment;
pub mod incumbent;
pub mod interval;
pub mod node;
pub mod problem;
pub mod random;
pub mod score;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use error::FdError;
