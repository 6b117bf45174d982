//! Collaborator interface consumed by the search core.

use crate::interval::{Interval, IntervalBox};

/// A constrained minimization problem over an interval box.
///
/// The search core never looks inside the constraint system or the
/// objective. It only asks the problem to narrow boxes, to enclose the
/// objective over a box, and to evaluate the objective at a point.
///
/// # Examples
///
/// ```
/// use u_fdive::interval::{Interval, IntervalBox};
/// use u_fdive::problem::BoxProblem;
///
/// /// minimize x^2 + y^2 with no constraints
/// struct Sphere;
///
/// impl BoxProblem for Sphere {
///     fn dim(&self) -> usize {
///         2
///     }
///
///     fn contract(&self, _bbox: &mut IntervalBox, _incumbent: f64) {}
///
///     fn goal_bounds(&self, bbox: &IntervalBox) -> Option<Interval> {
///         Some(bbox[0].sqr() + bbox[1].sqr())
///     }
///
///     fn eval_point(&self, x: &[f64]) -> f64 {
///         x[0] * x[0] + x[1] * x[1]
///     }
/// }
/// ```
pub trait BoxProblem: Send + Sync {
    /// Number of decision variables.
    fn dim(&self) -> usize;

    /// Narrows `bbox` to a sub-box containing every feasible point.
    ///
    /// `incumbent` is the best known objective value (`+inf` if none); an
    /// implementation may use it to cut away points whose objective cannot
    /// beat it. Proven infeasibility is signalled by leaving `bbox` empty
    /// (see [`IntervalBox::set_empty`]). Must be idempotent on a box it
    /// already returned.
    fn contract(&self, bbox: &mut IntervalBox, incumbent: f64);

    /// Enclosure of the objective over `bbox`. `None` when the problem has
    /// no objective.
    fn goal_bounds(&self, bbox: &IntervalBox) -> Option<Interval>;

    /// Objective value at a point. `+inf` when the problem has no
    /// objective or the value is undefined.
    fn eval_point(&self, x: &[f64]) -> f64;
}

/// Objective value at the midpoint of `bbox`.
///
/// Returns `+inf` for an unbounded or empty box, where a midpoint is not
/// meaningful.
pub fn eval_at_mid<P: BoxProblem + ?Sized>(problem: &P, bbox: &IntervalBox) -> f64 {
    if bbox.is_unbounded() || bbox.is_empty() {
        return f64::INFINITY;
    }
    problem.eval_point(&bbox.midpoint())
}
