//! Small problems shared by the unit tests.

use crate::interval::{Interval, IntervalBox};
use crate::problem::BoxProblem;

/// `min sum (x_i - c_i)^2` without constraints.
pub struct ShiftedSphere {
    pub center: Vec<f64>,
}

impl ShiftedSphere {
    pub fn new(center: Vec<f64>) -> Self {
        Self { center }
    }
}

fn sphere_bounds(center: &[f64], bbox: &IntervalBox) -> Interval {
    bbox.iter()
        .zip(center)
        .fold(Interval::point(0.0), |acc, (x, &c)| {
            acc + (*x - Interval::point(c)).sqr()
        })
}

fn sphere_point(center: &[f64], x: &[f64]) -> f64 {
    x.iter().zip(center).map(|(v, c)| (v - c) * (v - c)).sum()
}

impl BoxProblem for ShiftedSphere {
    fn dim(&self) -> usize {
        self.center.len()
    }

    fn contract(&self, _bbox: &mut IntervalBox, _incumbent: f64) {}

    fn goal_bounds(&self, bbox: &IntervalBox) -> Option<Interval> {
        Some(sphere_bounds(&self.center, bbox))
    }

    fn eval_point(&self, x: &[f64]) -> f64 {
        sphere_point(&self.center, x)
    }
}

/// `min sum (x_i - c_i)^2` subject to `sum x_i >= rhs`.
///
/// The contractor projects the linear constraint onto every variable and,
/// when an incumbent is known, bounds each term of the objective by it.
pub struct ConstrainedSphere {
    pub center: Vec<f64>,
    pub rhs: f64,
}

impl ConstrainedSphere {
    pub fn new(center: Vec<f64>, rhs: f64) -> Self {
        Self { center, rhs }
    }
}

impl BoxProblem for ConstrainedSphere {
    fn dim(&self) -> usize {
        self.center.len()
    }

    fn contract(&self, bbox: &mut IntervalBox, incumbent: f64) {
        if bbox.is_empty() {
            return;
        }
        if incumbent.is_finite() {
            let terms: Vec<Interval> = bbox
                .iter()
                .zip(&self.center)
                .map(|(x, &c)| (*x - Interval::point(c)).sqr())
                .collect();
            let total_lo: f64 = terms.iter().map(Interval::lo).sum();
            for i in 0..bbox.dim() {
                let slack = incumbent - (total_lo - terms[i].lo());
                if slack < 0.0 {
                    bbox.set_empty();
                    return;
                }
                let r = slack.sqrt();
                let c = self.center[i];
                let x = bbox[i];
                bbox[i] = Interval::new(x.lo().max(c - r), x.hi().min(c + r));
                if bbox[i].is_empty() {
                    bbox.set_empty();
                    return;
                }
            }
        }
        // sum x_i >= rhs  =>  x_i >= rhs - sum_{j != i} hi_j
        // runs last: a non-empty result always holds the corner (hi_1, ..., hi_n)
        let total_hi: f64 = bbox.iter().map(Interval::hi).sum();
        for i in 0..bbox.dim() {
            let others = total_hi - bbox[i].hi();
            let lo = bbox[i].lo().max(self.rhs - others);
            bbox[i] = Interval::new(lo, bbox[i].hi());
            if bbox[i].is_empty() {
                bbox.set_empty();
                return;
            }
        }
    }

    fn goal_bounds(&self, bbox: &IntervalBox) -> Option<Interval> {
        Some(sphere_bounds(&self.center, bbox))
    }

    fn eval_point(&self, x: &[f64]) -> f64 {
        if x.iter().sum::<f64>() < self.rhs {
            return f64::INFINITY;
        }
        sphere_point(&self.center, x)
    }
}

/// A problem whose contractor always proves infeasibility.
pub struct Infeasible {
    pub n: usize,
}

impl BoxProblem for Infeasible {
    fn dim(&self) -> usize {
        self.n
    }

    fn contract(&self, bbox: &mut IntervalBox, _incumbent: f64) {
        bbox.set_empty();
    }

    fn goal_bounds(&self, _bbox: &IntervalBox) -> Option<Interval> {
        Some(Interval::ENTIRE)
    }

    fn eval_point(&self, _x: &[f64]) -> f64 {
        f64::INFINITY
    }
}

/// A pure feasibility problem: no objective at all.
pub struct NoObjective {
    pub n: usize,
}

impl BoxProblem for NoObjective {
    fn dim(&self) -> usize {
        self.n
    }

    fn contract(&self, _bbox: &mut IntervalBox, _incumbent: f64) {}

    fn goal_bounds(&self, _bbox: &IntervalBox) -> Option<Interval> {
        None
    }

    fn eval_point(&self, _x: &[f64]) -> f64 {
        f64::INFINITY
    }
}

/// Sphere whose contractor wrongly reports emptiness for large boxes.
pub struct SpuriousEmpty {
    pub sphere: ShiftedSphere,
    pub max_volume: f64,
}

impl BoxProblem for SpuriousEmpty {
    fn dim(&self) -> usize {
        self.sphere.dim()
    }

    fn contract(&self, bbox: &mut IntervalBox, _incumbent: f64) {
        if bbox.volume() > self.max_volume {
            bbox.set_empty();
        }
    }

    fn goal_bounds(&self, bbox: &IntervalBox) -> Option<Interval> {
        self.sphere.goal_bounds(bbox)
    }

    fn eval_point(&self, x: &[f64]) -> f64 {
        self.sphere.eval_point(x)
    }
}

/// Objective that evaluates to NaN everywhere.
pub struct NanObjective {
    pub n: usize,
}

impl BoxProblem for NanObjective {
    fn dim(&self) -> usize {
        self.n
    }

    fn contract(&self, _bbox: &mut IntervalBox, _incumbent: f64) {}

    fn goal_bounds(&self, _bbox: &IntervalBox) -> Option<Interval> {
        Some(Interval::new(f64::NAN, f64::NAN))
    }

    fn eval_point(&self, _x: &[f64]) -> f64 {
        f64::NAN
    }
}
