//! Best-first branch-and-bound loop over a [`TempBuffer`].

use super::config::BestFirstConfig;
use crate::buffer::{TempBuffer, TriggerCounts};
use crate::error::FdError;
use crate::incumbent::Incumbent;
use crate::interval::IntervalBox;
use crate::node::Node;
use crate::problem::{eval_at_mid, BoxProblem};
use crate::random::create_rng;
use crate::stats::{RunStats, StatsRecorder};
use rand::Rng;
use std::time::Instant;
use tracing::{debug, trace};

/// Why a best-first search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BestFirstStatus {
    /// An incumbent exists and `minimum >= loup - abs_eps_f` (this includes
    /// an emptied buffer).
    Converged,
    /// The buffer ran empty without any incumbent.
    Exhausted,
    /// `max_nodes` was reached.
    NodeLimit,
    /// The timeout fired.
    TimeLimit,
}

/// Result of a best-first search.
#[derive(Debug, Clone)]
pub struct BestFirstOutcome {
    /// Best upper bound (`+inf` if no feasible value was found).
    pub loup: f64,

    /// Valid lower bound on the optimum.
    pub uplo: f64,

    pub status: BestFirstStatus,

    /// Buffer trigger counters at the end of the run.
    pub triggers: TriggerCounts,

    /// Nodes that reached `eps_box` and were not split.
    pub small_boxes: usize,

    pub stats: RunStats,
}

/// Best-first branch and bound driven by the priority buffer.
///
/// Each iteration pops the best-scoring node, contracts it against the
/// incumbent, harvests upper bounds, prunes the buffer with any improved
/// incumbent and splits the node, pushing both children with their
/// objective enclosures. The reported lower bound `uplo` comes from the
/// buffer minimum, never from the biased score.
pub struct BestFirstRunner;

impl BestFirstRunner {
    /// Runs with a generator seeded from `config.seed` (random if unset).
    ///
    /// # Examples
    ///
    /// ```
    /// use u_fdive::bestfirst::{BestFirstConfig, BestFirstRunner, BestFirstStatus};
    /// use u_fdive::interval::{Interval, IntervalBox};
    /// use u_fdive::problem::BoxProblem;
    ///
    /// struct Parabola;
    ///
    /// impl BoxProblem for Parabola {
    ///     fn dim(&self) -> usize { 1 }
    ///     fn contract(&self, _bbox: &mut IntervalBox, _ub: f64) {}
    ///     fn goal_bounds(&self, bbox: &IntervalBox) -> Option<Interval> {
    ///         Some((bbox[0] - Interval::point(0.3)).sqr() + Interval::point(1.0))
    ///     }
    ///     fn eval_point(&self, x: &[f64]) -> f64 { (x[0] - 0.3) * (x[0] - 0.3) + 1.0 }
    /// }
    ///
    /// let root = IntervalBox::from_bounds(&[(-1.0, 1.0)]);
    /// let config = BestFirstConfig::default().with_abs_eps_f(1e-6).with_seed(0);
    /// let out = BestFirstRunner::run(&Parabola, &root, &config).unwrap();
    /// assert_eq!(out.status, BestFirstStatus::Converged);
    /// assert!(out.uplo <= 1.0 && 1.0 <= out.loup);
    /// assert!(out.loup - out.uplo <= 1e-6 + 1e-12);
    /// ```
    pub fn run<P: BoxProblem + ?Sized>(
        problem: &P,
        root: &IntervalBox,
        config: &BestFirstConfig,
    ) -> Result<BestFirstOutcome, FdError> {
        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };
        Self::run_with_rng(problem, root, config, &mut rng)
    }

    /// Runs with a caller-supplied generator.
    pub fn run_with_rng<P, R>(
        problem: &P,
        root: &IntervalBox,
        config: &BestFirstConfig,
        rng: &mut R,
    ) -> Result<BestFirstOutcome, FdError>
    where
        P: BoxProblem + ?Sized,
        R: Rng + ?Sized,
    {
        config.validate()?;
        if root.dim() != problem.dim() {
            return Err(FdError::DimensionMismatch {
                expected: problem.dim(),
                actual: root.dim(),
            });
        }

        let started = Instant::now();
        let schedule = &config.schedule;
        let mut rec = StatsRecorder::start();
        let mut buffer = TempBuffer::new(config.buffer.clone())?;
        let mut incumbent = Incumbent::with_hint(config.initial_loup);
        buffer.contract(incumbent.value());
        // incumbent at the last expansion, reference of the decay factor
        let mut ub_prev = incumbent.value();

        let mut small_boxes = 0usize;
        let mut uplo_small = f64::INFINITY;

        let mut root_node = Node::root(root.clone(), schedule);
        root_node.goal_bounds = problem
            .goal_bounds(&root_node.bbox)
            .filter(|g| !g.is_empty());
        buffer.push(root_node);

        debug!(
            dim = problem.dim(),
            max_nodes = config.max_nodes,
            initial_loup = config.initial_loup,
            "best-first started"
        );

        let status = loop {
            // an empty buffer has minimum +inf, so a found incumbent converges
            let gap_closed = buffer.minimum() >= incumbent.value() - config.abs_eps_f;
            if incumbent.has_value() && gap_closed {
                break BestFirstStatus::Converged;
            }
            if buffer.is_empty() {
                break BestFirstStatus::Exhausted;
            }
            if rec.nodes() >= config.max_nodes as u64 {
                break BestFirstStatus::NodeLimit;
            }
            if config.timeout.is_some_and(|t| started.elapsed() >= t) {
                break BestFirstStatus::TimeLimit;
            }
            let Some(mut node) = buffer.pop() else {
                break BestFirstStatus::Exhausted;
            };
            rec.visit(node.depth);

            problem.contract(&mut node.bbox, incumbent.value());
            if node.bbox.is_empty() {
                continue;
            }

            node.goal_bounds = problem.goal_bounds(&node.bbox).filter(|g| !g.is_empty());
            let before = incumbent.value();
            if let Some(g) = node.goal_bounds {
                incumbent.offer(g.hi());
            }
            incumbent.offer(eval_at_mid(problem, &node.bbox));
            if incumbent.value() < before {
                trace!(depth = node.depth, loup = incumbent.value(), "loup improved");
                buffer.contract(incumbent.value());
            }

            let lb = node.lower_bound();
            if incumbent.prunes(lb, config.abs_eps_f) {
                continue;
            }

            if node.bbox.max_diam() < config.eps_box {
                small_boxes += 1;
                uplo_small = uplo_small.min(lb);
                continue;
            }

            let k_eff = schedule.k_eff(ub_prev, incumbent.value());
            ub_prev = incumbent.value();
            let (mut left, mut right) = node.split_with(schedule, k_eff, rng);
            for child in [&mut left, &mut right] {
                child.goal_bounds = problem.goal_bounds(&child.bbox).filter(|g| !g.is_empty());
            }
            buffer.push(left);
            buffer.push(right);
        };

        let loup = incumbent.value();
        let uplo = buffer
            .minimum()
            .min(uplo_small)
            .min(loup - config.abs_eps_f);
        let stats = rec.finish(0, "best_first", loup, status == BestFirstStatus::Converged);

        debug!(
            ?status,
            loup,
            uplo,
            nodes = stats.nodes_visited,
            "best-first finished"
        );

        Ok(BestFirstOutcome {
            loup,
            uplo,
            status,
            triggers: buffer.triggers(),
            small_boxes,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferConfig;
    use crate::node::{Randomization, TemperatureSchedule};
    use crate::testing::{ConstrainedSphere, Infeasible, NoObjective, ShiftedSphere};
    use std::time::Duration;

    fn config() -> BestFirstConfig {
        BestFirstConfig::default()
            .with_abs_eps_f(1e-6)
            .with_max_nodes(20_000)
            .with_seed(0)
    }

    #[test]
    fn test_sphere_converges() {
        let p = ShiftedSphere::new(vec![0.3, -0.7]);
        let root = IntervalBox::cube(2, -1.0, 1.0);
        let out = BestFirstRunner::run(&p, &root, &config()).unwrap();
        assert_eq!(out.status, BestFirstStatus::Converged);
        assert!(out.uplo <= 0.0 + 1e-12);
        assert!(out.loup >= 0.0);
        assert!(out.loup - out.uplo <= 1e-6 + 1e-12);
        assert!(out.stats.reached_optimum);
    }

    #[test]
    fn test_constrained_bounds_bracket_optimum() {
        let p = ConstrainedSphere::new(vec![0.0, 0.0], 1.0);
        let root = IntervalBox::cube(2, -2.0, 2.0);
        let out = BestFirstRunner::run(&p, &root, &config().with_abs_eps_f(1e-3)).unwrap();
        // optimum 0.5 at (0.5, 0.5)
        assert!(out.uplo <= 0.5 + 1e-12, "uplo {}", out.uplo);
        assert!(out.loup >= 0.5 - 1e-12, "loup {}", out.loup);
        assert!(out.loup - 0.5 < 1e-3);
    }

    #[test]
    fn test_infeasible_is_exhausted() {
        let root = IntervalBox::cube(2, 0.0, 1.0);
        let out = BestFirstRunner::run(&Infeasible { n: 2 }, &root, &config()).unwrap();
        assert_eq!(out.status, BestFirstStatus::Exhausted);
        assert_eq!(out.loup, f64::INFINITY);
        assert_eq!(out.uplo, f64::INFINITY);
        assert_eq!(out.stats.nodes_visited, 1);
    }

    #[test]
    fn test_node_limit() {
        let p = NoObjective { n: 2 };
        let root = IntervalBox::cube(2, 0.0, 1.0);
        let out = BestFirstRunner::run(&p, &root, &config().with_max_nodes(50)).unwrap();
        assert_eq!(out.status, BestFirstStatus::NodeLimit);
        assert_eq!(out.stats.nodes_visited, 50);
        assert_eq!(out.uplo, f64::NEG_INFINITY);
    }

    #[test]
    fn test_timeout() {
        let p = NoObjective { n: 2 };
        let root = IntervalBox::cube(2, 0.0, 1.0);
        let config = config()
            .with_max_nodes(usize::MAX)
            .with_timeout(Duration::ZERO);
        let out = BestFirstRunner::run(&p, &root, &config).unwrap();
        assert_eq!(out.status, BestFirstStatus::TimeLimit);
        assert_eq!(out.stats.nodes_visited, 0);
    }

    #[test]
    fn test_initial_loup_prunes_everything() {
        let p = ShiftedSphere::new(vec![5.0]);
        let root = IntervalBox::cube(1, 0.0, 1.0);
        // true optimum on the box is 16; a hint below it rejects the root
        let out = BestFirstRunner::run(&p, &root, &config().with_initial_loup(1.0)).unwrap();
        assert_eq!(out.status, BestFirstStatus::Converged);
        assert_eq!(out.loup, 1.0);
        assert!(out.uplo < 1.0);
        assert_eq!(out.stats.nodes_visited, 0);
    }

    #[test]
    fn test_small_boxes_keep_bound() {
        let p = NoObjective { n: 1 };
        let root = IntervalBox::cube(1, 0.0, 1.0);
        let config = config().with_eps_box(0.3).with_max_nodes(100);
        let out = BestFirstRunner::run(&p, &root, &config).unwrap();
        // 1 -> 0.5 -> 0.25: four boxes below eps_box
        assert_eq!(out.status, BestFirstStatus::Exhausted);
        assert_eq!(out.small_boxes, 4);
        assert_eq!(out.stats.nodes_visited, 7);
        assert_eq!(out.uplo, f64::NEG_INFINITY);
    }

    #[test]
    fn test_triggers_reported() {
        let p = ShiftedSphere::new(vec![0.3, -0.7]);
        let root = IntervalBox::cube(2, -1.0, 1.0);
        let config = config().with_buffer(BufferConfig::default().with_depth_cut(4));
        let out = BestFirstRunner::run(&p, &root, &config).unwrap();
        assert!(out.triggers.depth > 0);
        assert_eq!(out.triggers.total, out.triggers.depth);
    }

    #[test]
    fn test_randomized_schedule_reproducible() {
        let p = ConstrainedSphere::new(vec![0.1, 0.2], 0.8);
        let root = IntervalBox::cube(2, -2.0, 2.0);
        let schedule =
            TemperatureSchedule::default().with_randomization(Randomization::PerChildUniform);
        let config = config().with_schedule(schedule).with_max_nodes(500).with_seed(5);
        let a = BestFirstRunner::run(&p, &root, &config).unwrap();
        let b = BestFirstRunner::run(&p, &root, &config).unwrap();
        assert_eq!(a.loup.to_bits(), b.loup.to_bits());
        assert_eq!(a.uplo.to_bits(), b.uplo.to_bits());
        assert_eq!(a.stats.nodes_visited, b.stats.nodes_visited);
    }
}
