//! Variant dispatch and repeated runs.

use super::log::ResultLog;
use super::variant::{Variant, VariantParams};
use crate::bnb::BnbRunner;
use crate::dive::DiveRunner;
use crate::error::FdError;
use crate::incumbent::Incumbent;
use crate::interval::IntervalBox;
use crate::node::Node;
use crate::problem::BoxProblem;
use crate::random::run_rng;
use crate::stats::RunStats;
use std::io::Write;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Runs `variant` once as run number `run_id`.
///
/// Randomized variants draw from a generator seeded with
/// `RUN_SEED_BASE + run_id`, shared by every dive of a B&B run. The
/// depth-budget dives fall back to the `base` dive on an unbounded root.
///
/// # Examples
///
/// ```
/// use u_fdive::experiment::{run_variant, Variant, VariantParams};
/// use u_fdive::interval::{Interval, IntervalBox};
/// use u_fdive::problem::BoxProblem;
///
/// struct Parabola;
///
/// impl BoxProblem for Parabola {
///     fn dim(&self) -> usize { 1 }
///     fn contract(&self, _bbox: &mut IntervalBox, _ub: f64) {}
///     fn goal_bounds(&self, bbox: &IntervalBox) -> Option<Interval> {
///         Some((bbox[0] - Interval::point(0.3)).sqr())
///     }
///     fn eval_point(&self, x: &[f64]) -> f64 { (x[0] - 0.3) * (x[0] - 0.3) }
/// }
///
/// let root = IntervalBox::from_bounds(&[(-1.0, 1.0)]);
/// let params = VariantParams::default().with_eps_box(1e-6);
/// let stats = run_variant(&Parabola, &root, Variant::DepthKRand, &params, 3).unwrap();
/// assert_eq!(stats.run_id, 3);
/// assert_eq!(stats.variant, "depth_k_rand");
/// assert!(stats.reached_optimum);
/// ```
pub fn run_variant<P: BoxProblem + ?Sized>(
    problem: &P,
    root: &IntervalBox,
    variant: Variant,
    params: &VariantParams,
    run_id: usize,
) -> Result<RunStats, FdError> {
    let mut rng = run_rng(run_id);

    let mut stats = if variant.is_bnb() {
        let config = variant.bnb_config(params);
        BnbRunner::run_with_rng(problem, root, &config, &mut rng)?.stats
    } else {
        let (config, fallback) = match variant.fallback_label() {
            Some(label) if root.is_unbounded() => (Variant::Base.dive_config(params), Some(label)),
            _ => (variant.dive_config(params), None),
        };
        let start = Node::root(root.clone(), &config.schedule);
        let mut incumbent = Incumbent::new();
        let mut stats =
            DiveRunner::run_from(problem, start, &mut incumbent, &config, &mut rng)?.stats;
        if let Some(label) = fallback {
            debug!(variant = variant.label(), "unbounded root, running base dive");
            stats.variant = label.to_string();
        }
        stats
    };

    stats.run_id = run_id;
    Ok(stats)
}

/// Repeats one variant over a range of run ids.
///
/// With the `parallel` feature and [`with_parallel`](Self::with_parallel)
/// enabled, runs execute on the rayon pool; each run owns its whole
/// search state, and only the optional [`ResultLog`] is shared.
#[derive(Debug, Clone)]
pub struct Experiment {
    pub variant: Variant,
    pub params: VariantParams,

    /// Number of runs; run ids are `0..runs`.
    pub runs: usize,

    /// Run on the rayon pool (only with the `parallel` feature).
    pub parallel: bool,
}

impl Experiment {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            params: VariantParams::default(),
            runs: 1,
            parallel: false,
        }
    }

    pub fn with_params(mut self, params: VariantParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Executes every run; results are ordered by run id.
    pub fn run<P>(&self, problem: &P, root: &IntervalBox) -> Result<Vec<RunStats>, FdError>
    where
        P: BoxProblem + ?Sized,
    {
        self.execute(problem, root, |_| Ok(()))
    }

    /// Executes every run and appends each result to `log` as it finishes.
    ///
    /// Rows reach the log in completion order, which differs from run
    /// order when running in parallel.
    pub fn run_logged<P, W>(
        &self,
        problem: &P,
        root: &IntervalBox,
        log: &ResultLog<W>,
    ) -> Result<Vec<RunStats>, FdError>
    where
        P: BoxProblem + ?Sized,
        W: Write + Send,
    {
        log.write_header()?;
        let results = self.execute(problem, root, |stats| log.append(stats))?;
        log.flush()?;
        Ok(results)
    }

    fn execute<P, F>(
        &self,
        problem: &P,
        root: &IntervalBox,
        sink: F,
    ) -> Result<Vec<RunStats>, FdError>
    where
        P: BoxProblem + ?Sized,
        F: Fn(&RunStats) -> Result<(), FdError> + Sync,
    {
        info!(
            variant = self.variant.label(),
            runs = self.runs,
            parallel = self.parallel,
            "experiment started"
        );
        let one = |run_id: usize| -> Result<RunStats, FdError> {
            let stats = run_variant(problem, root, self.variant, &self.params, run_id)?;
            sink(&stats)?;
            Ok(stats)
        };

        #[cfg(feature = "parallel")]
        let results: Result<Vec<RunStats>, FdError> = if self.parallel {
            (0..self.runs).into_par_iter().map(one).collect()
        } else {
            (0..self.runs).map(one).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let results: Result<Vec<RunStats>, FdError> = (0..self.runs).map(one).collect();

        let results = results?;
        debug!(
            variant = self.variant.label(),
            optimal = results.iter().filter(|s| s.reached_optimum).count(),
            "experiment finished"
        );
        Ok(results)
    }
}
