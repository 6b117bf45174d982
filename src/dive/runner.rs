//! Dive execution loop.

use super::config::{DiveConfig, SelectionPolicy};
use crate::error::FdError;
use crate::incumbent::Incumbent;
use crate::interval::IntervalBox;
use crate::node::Node;
use crate::problem::{eval_at_mid, BoxProblem};
use crate::random::create_rng;
use crate::score::{child_scores, pick_child, Child};
use crate::stats::{RunStats, StatsRecorder};
use rand::Rng;
use tracing::{debug, trace};

/// Why a dive ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiveStop {
    /// Contraction emptied the current box.
    Infeasible,
    /// Every width fell below `eps_box`.
    Precision,
    /// The relative volume fell below the threshold.
    VolumeCutoff,
    /// `max_iterations` was exhausted.
    IterationLimit,
}

/// Result of a dive.
#[derive(Debug, Clone)]
pub struct DiveOutcome {
    /// Incumbent after the dive (`+inf` if none).
    pub best_value: f64,

    /// Visit statistics. `reached_optimum` is `true` iff `best_value` is finite.
    pub stats: RunStats,

    /// Stopping reason.
    pub stop: DiveStop,

    /// The node the dive ended on, after contraction.
    pub last: Node,

    /// Absolute depth budget in force when the dive ended
    /// (`None` unless the policy is [`SelectionPolicy::DepthBudget`]).
    pub depth_budget: Option<usize>,

    /// Number of times the depth budget was extended.
    pub budget_extensions: usize,
}

/// Executes a feasible dive.
///
/// From a start box the dive repeatedly contracts, harvests upper bounds
/// from the objective enclosure and the midpoint, bisects the widest
/// dimension, and continues into the child with the better thermal score.
/// It never backtracks.
pub struct DiveRunner;

impl DiveRunner {
    /// Dives from `root` at depth 0 with the schedule's initial temperature
    /// and no incumbent.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_fdive::dive::{DiveConfig, DiveRunner, DiveStop};
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
    /// let config = DiveConfig::default().with_eps_box(1e-6).with_seed(1);
    /// let out = DiveRunner::run(&Parabola, &root, &config).unwrap();
    /// assert_eq!(out.stop, DiveStop::Precision);
    /// assert!(out.best_value < 1e-10);
    /// ```
    pub fn run<P: BoxProblem + ?Sized>(
        problem: &P,
        root: &IntervalBox,
        config: &DiveConfig,
    ) -> Result<DiveOutcome, FdError> {
        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };
        let start = Node::root(root.clone(), &config.schedule);
        let mut incumbent = Incumbent::new();
        Self::run_from(problem, start, &mut incumbent, config, &mut rng)
    }

    /// Dives from an arbitrary node, tightening `incumbent` in place.
    ///
    /// `start.depth` is the base depth: depth budgets and the volume
    /// cutoff are measured relative to it, and the precision stop only
    /// applies below it.
    pub fn run_from<P, R>(
        problem: &P,
        start: Node,
        incumbent: &mut Incumbent,
        config: &DiveConfig,
        rng: &mut R,
    ) -> Result<DiveOutcome, FdError>
    where
        P: BoxProblem + ?Sized,
        R: Rng + ?Sized,
    {
        config.validate()?;
        if start.bbox.dim() != problem.dim() {
            return Err(FdError::DimensionMismatch {
                expected: problem.dim(),
                actual: start.bbox.dim(),
            });
        }
        Ok(dive(problem, start, incumbent, config, rng))
    }
}

/// Volume test in log space: `ln(V/V0) <= ln(eps_v) - beta * d + ln(factor)`.
///
/// A `-inf` ratio (flat or empty box) always satisfies it; NaN never does.
pub fn volume_cutoff_reached(
    log_ratio: f64,
    eps_v: f64,
    beta: f64,
    depth: usize,
    factor: f64,
) -> bool {
    log_ratio <= eps_v.ln() - beta * depth as f64 + factor.ln()
}

/// The dive loop proper. Assumes a validated config and matching dimension.
pub(crate) fn dive<P, R>(
    problem: &P,
    start: Node,
    incumbent: &mut Incumbent,
    config: &DiveConfig,
    rng: &mut R,
) -> DiveOutcome
where
    P: BoxProblem + ?Sized,
    R: Rng + ?Sized,
{
    let schedule = &config.schedule;
    let randomized = schedule.is_randomized();
    let base_depth = start.depth;
    let mut rec = StatsRecorder::start();

    let mut d_max_run = 0usize;
    let mut budget = 0usize;
    let mut volume_factor = 1.0;
    match config.selection {
        SelectionPolicy::DepthBudget { d_max } => {
            d_max_run = d_max;
            if randomized && config.depth_jitter > 0 {
                let j = config.depth_jitter as i64;
                let shifted = d_max as i64 + rng.random_range(-j..=j);
                d_max_run = shifted.max(1) as usize;
            }
            budget = d_max_run.saturating_sub(base_depth);
        }
        SelectionPolicy::VolumeRatio { .. } => {
            if randomized && config.volume_jitter > 0.0 {
                let v = config.volume_jitter;
                volume_factor = rng.random_range((1.0 - v)..=(1.0 + v));
            }
        }
        SelectionPolicy::None => {}
    }
    let mut extensions = 0usize;

    let log_v0 = start.bbox.log_volume();
    let volume_enabled = !start.bbox.is_unbounded() && log_v0.is_finite();

    debug!(
        label = config.label(),
        base_depth,
        incumbent = incumbent.value(),
        "dive started"
    );

    let mut node = start;
    let mut stop = DiveStop::IterationLimit;
    // the first step compares against the incumbent the dive started from
    let mut ub_prev = incumbent.value();

    for _ in 0..config.max_iterations {
        rec.visit(node.depth);

        problem.contract(&mut node.bbox, incumbent.value());
        if node.bbox.is_empty() {
            stop = DiveStop::Infeasible;
            break;
        }

        node.goal_bounds = problem.goal_bounds(&node.bbox);
        if let Some(g) = node.goal_bounds.filter(|g| !g.is_empty()) {
            incumbent.offer(g.hi());
        }
        incumbent.offer(eval_at_mid(problem, &node.bbox));

        let local = node.depth - base_depth;
        match config.selection {
            SelectionPolicy::DepthBudget { .. } => {
                if local >= budget {
                    budget += d_max_run;
                    extensions += 1;
                    trace!(
                        depth = node.depth,
                        budget = base_depth + budget,
                        "depth budget extended"
                    );
                }
            }
            SelectionPolicy::VolumeRatio { eps_v, beta } => {
                if volume_enabled && local >= config.volume_warmup {
                    let log_ratio = node.bbox.log_volume() - log_v0;
                    if volume_cutoff_reached(log_ratio, eps_v, beta, local, volume_factor) {
                        stop = DiveStop::VolumeCutoff;
                        break;
                    }
                }
            }
            SelectionPolicy::None => {}
        }

        if node.depth > base_depth && node.bbox.max_diam() < config.eps_box {
            stop = DiveStop::Precision;
            break;
        }

        let k_eff = schedule.k_eff(ub_prev, incumbent.value());
        ub_prev = incumbent.value();
        let (left, right) = node.split_with(schedule, k_eff, rng);

        let (score_left, score_right) = child_scores(problem, &left, &right);
        node = match pick_child(score_left, score_right) {
            Child::Left => left,
            Child::Right => right,
        };
    }

    let best_value = incumbent.value();
    let reached = best_value.is_finite();
    let stats = rec.finish(0, config.label(), best_value, reached);

    debug!(
        label = config.label(),
        ?stop,
        best = best_value,
        nodes = stats.nodes_visited,
        max_depth = stats.max_depth,
        "dive finished"
    );

    let depth_budget = match config.selection {
        SelectionPolicy::DepthBudget { .. } => Some(base_depth + budget),
        _ => None,
    };

    DiveOutcome {
        best_value,
        stats,
        stop,
        last: node,
        depth_budget,
        budget_extensions: extensions,
    }
}
