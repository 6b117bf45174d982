//! Node scoring for child selection.
//!
//! Scores follow a max-is-best convention: the base term is the negated
//! lower bound of the objective, so the child whose enclosure starts lower
//! looks more promising, and the thermal term adds the child's inherited
//! temperature on top.

use crate::interval::{Interval, IntervalBox};
use crate::node::Node;
use crate::problem::BoxProblem;

/// Which half of a split was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    /// The half that keeps the parent's lower bound on the split dimension.
    Left,
    Right,
}

/// Base score `-lb(f, bbox)`.
///
/// Uses `cached` when it holds a non-empty enclosure, otherwise evaluates
/// the objective over `bbox`. Problems without an objective, or whose
/// enclosure is empty or NaN, score `0`.
pub fn heuristic_score<P: BoxProblem + ?Sized>(
    problem: &P,
    bbox: &IntervalBox,
    cached: Option<Interval>,
) -> f64 {
    let bounds = match cached {
        Some(g) if !g.is_empty() => Some(g),
        _ => problem.goal_bounds(bbox),
    };
    match bounds {
        Some(g) if !g.is_empty() => -g.lo(),
        _ => 0.0,
    }
}

/// Base score plus the thermal bonus.
#[inline]
pub fn thermal_score(base: f64, temperature: f64) -> f64 {
    base + temperature
}

/// Thermal scores of the two children of a split, each from its own
/// cached bound (if any) and inherited temperature.
pub fn child_scores<P: BoxProblem + ?Sized>(problem: &P, left: &Node, right: &Node) -> (f64, f64) {
    (
        thermal_score(
            heuristic_score(problem, &left.bbox, left.goal_bounds),
            left.temperature,
        ),
        thermal_score(
            heuristic_score(problem, &right.bbox, right.goal_bounds),
            right.temperature,
        ),
    )
}

/// Picks the higher-scoring child. Equal scores go left.
///
/// A NaN score never wins against a number.
pub fn pick_child(score_left: f64, score_right: f64) -> Child {
    if score_right.is_nan() || score_left >= score_right {
        Child::Left
    } else {
        Child::Right
    }
}
