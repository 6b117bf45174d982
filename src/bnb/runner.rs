//! Stack branch-and-bound loop with a dive at every node.

use super::config::BnbConfig;
use crate::dive::dive;
use crate::error::FdError;
use crate::incumbent::Incumbent;
use crate::interval::IntervalBox;
use crate::node::Node;
use crate::problem::{eval_at_mid, BoxProblem};
use crate::random::create_rng;
use crate::stats::{RunStats, StatsRecorder};
use rand::Rng;
use tracing::{debug, trace};

/// Result of a stack branch-and-bound run.
#[derive(Debug, Clone)]
pub struct BnbOutcome {
    /// Final incumbent (`+inf` if none was found).
    pub best_value: f64,

    /// Aggregated statistics, dive iterations included.
    /// `reached_optimum` is `true` once any incumbent was found.
    pub stats: RunStats,

    /// Nodes dived from (the quantity bounded by `max_bb_nodes`).
    pub processed: usize,

    /// Nodes discarded by the bound test.
    pub pruned: usize,

    /// Empty or invalid nodes split because they were shallow.
    pub forced_splits: usize,

    /// Processed nodes already below `eps_box`, not expanded further.
    pub leaves: usize,

    /// `true` if the worklist ran empty before the node budget.
    pub exhausted: bool,

    /// Nodes left on the worklist when the run stopped, next to pop last.
    pub open: Vec<Node>,
}

/// Depth-first branch-and-bound over an explicit LIFO worklist.
///
/// Each popped node is validated, contracted against the incumbent and
/// bound-tested. Survivors launch a dive (which may tighten the incumbent)
/// and are then split along their widest dimension; the right child is
/// pushed first so the left one is explored first.
pub struct BnbRunner;

impl BnbRunner {
    /// Runs with a generator seeded from `config.dive.seed` (random if unset).
    pub fn run<P: BoxProblem + ?Sized>(
        problem: &P,
        root: &IntervalBox,
        config: &BnbConfig,
    ) -> Result<BnbOutcome, FdError> {
        let mut rng = match config.dive.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };
        Self::run_with_rng(problem, root, config, &mut rng)
    }

    /// Runs with a caller-supplied generator, shared by every dive.
    pub fn run_with_rng<P, R>(
        problem: &P,
        root: &IntervalBox,
        config: &BnbConfig,
        rng: &mut R,
    ) -> Result<BnbOutcome, FdError>
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

        let dim = problem.dim();
        let schedule = &config.dive.schedule;
        let label = config.label();
        let mut rec = StatsRecorder::start();
        let mut incumbent = Incumbent::with_hint(config.initial_ub);
        // incumbent at the last expansion; dives keep their own reference
        let mut ub_prev = incumbent.value();

        let mut processed = 0usize;
        let mut pruned = 0usize;
        let mut forced_splits = 0usize;
        let mut leaves = 0usize;

        let mut active = vec![Node::root(root.clone(), schedule)];

        debug!(
            label = %label,
            dim,
            max_bb_nodes = config.max_bb_nodes,
            "bnb started"
        );

        while processed < config.max_bb_nodes {
            let Some(node) = active.pop() else {
                break;
            };

            if node.bbox.is_empty() || !node.bbox.is_valid(dim) {
                if node.depth < config.min_force_depth && node.bbox.dim() == dim {
                    trace!(depth = node.depth, "forced split of invalid node");
                    force_split(node, config, &mut active);
                    forced_splits += 1;
                }
                continue;
            }

            rec.visit(node.depth);

            let mut bbox = node.bbox.clone();
            problem.contract(&mut bbox, incumbent.value());
            if bbox.is_empty() {
                if node.depth < config.min_force_depth {
                    trace!(depth = node.depth, "forced split of emptied node");
                    force_split(node, config, &mut active);
                    forced_splits += 1;
                }
                continue;
            }

            let goal = problem.goal_bounds(&bbox).filter(|g| !g.is_empty());
            if let Some(g) = goal {
                if incumbent.prunes(g.lo(), config.prune_tolerance) {
                    trace!(
                        depth = node.depth,
                        lb = g.lo(),
                        ub = incumbent.value(),
                        "pruned"
                    );
                    pruned += 1;
                    continue;
                }
                incumbent.offer(g.hi());
                incumbent.offer(eval_at_mid(problem, &bbox));
            }

            let depth = node.depth;
            let start = Node {
                bbox: bbox.clone(),
                depth,
                temperature: node.temperature,
                goal_bounds: goal,
            };
            let before = incumbent.value();
            let outcome = dive(problem, start, &mut incumbent, &config.dive, rng);
            rec.absorb_dive(&outcome.stats, depth);
            if incumbent.value() < before {
                trace!(depth, ub = incumbent.value(), "incumbent improved by dive");
            }

            processed += 1;

            if bbox.max_diam() < config.dive.eps_box {
                leaves += 1;
                continue;
            }

            let k_eff = schedule.k_eff(ub_prev, incumbent.value());
            ub_prev = incumbent.value();
            let expanded = Node {
                bbox,
                depth,
                temperature: node.temperature,
                goal_bounds: None,
            };
            let (left, right) = expanded.split_with(schedule, k_eff, rng);
            active.push(right);
            active.push(left);
        }

        let exhausted = active.is_empty();
        let best_value = incumbent.value();
        let stats = rec.finish(0, label, best_value, incumbent.has_value());

        debug!(
            best = best_value,
            nodes = stats.nodes_visited,
            processed,
            pruned,
            forced_splits,
            exhausted,
            "bnb finished"
        );

        Ok(BnbOutcome {
            best_value,
            stats,
            processed,
            pruned,
            forced_splits,
            leaves,
            exhausted,
            open: active,
        })
    }
}

/// Splits the node's own (pre-contraction) box and pushes both children.
fn force_split(node: Node, config: &BnbConfig, active: &mut Vec<Node>) {
    let schedule = &config.dive.schedule;
    let t = schedule.child_temperature(node.temperature, schedule.k);
    let (left, right) = node.split((t, t));
    active.push(right);
    active.push(left);
}
