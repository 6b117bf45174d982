//! Experiment harness: the variant catalogue, repeated runs, and the CSV log.
//!
//! A [`Variant`] names one of the ten benchmarked configurations
//! (`base`, `depth_k_rand_bb`, ...). [`run_variant`] executes one run and
//! returns its [`RunStats`](crate::stats::RunStats); [`Experiment`] repeats
//! a variant over run ids, optionally in parallel, and can stream rows into
//! a [`ResultLog`].
//!
//! # Example
//!
//! ```
//! use u_fdive::experiment::{Experiment, ResultLog, Variant, VariantParams};
//! use u_fdive::interval::{Interval, IntervalBox};
//! use u_fdive::problem::BoxProblem;
//!
//! struct Bowl;
//!
//! impl BoxProblem for Bowl {
//!     fn dim(&self) -> usize { 2 }
//!     fn contract(&self, _bbox: &mut IntervalBox, _ub: f64) {}
//!     fn goal_bounds(&self, bbox: &IntervalBox) -> Option<Interval> {
//!         Some(bbox[0].sqr() + bbox[1].sqr())
//!     }
//!     fn eval_point(&self, x: &[f64]) -> f64 { x[0] * x[0] + x[1] * x[1] }
//! }
//!
//! let root = IntervalBox::cube(2, -1.0, 2.0);
//! let log = ResultLog::new(Vec::new());
//! let results = Experiment::new(Variant::VolKRand)
//!     .with_params(VariantParams::default().with_eps_box(1e-6))
//!     .with_runs(3)
//!     .run_logged(&Bowl, &root, &log)
//!     .unwrap();
//! assert_eq!(results.len(), 3);
//! assert_eq!(log.rows(), 3);
//! ```

mod log;
mod runner;
mod variant;

pub use log::ResultLog;
pub use runner::{run_variant, Experiment};
pub use variant::{Variant, VariantParams};
