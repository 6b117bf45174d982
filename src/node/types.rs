//! Search-tree node.

use super::config::TemperatureSchedule;
use crate::interval::{Interval, IntervalBox};
use rand::Rng;

/// One unit of search state.
///
/// A node exclusively owns its box. Splitting consumes the node and
/// returns the two children, so a box is either pending on a worklist or
/// being processed, never both.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Current region.
    pub bbox: IntervalBox,

    /// 0 at the root, parent depth + 1 for each child.
    pub depth: usize,

    /// Inherited exploration temperature.
    pub temperature: f64,

    /// Last objective enclosure computed over `bbox`, if any.
    pub goal_bounds: Option<Interval>,
}

impl Node {
    /// Root node at depth 0 carrying the schedule's initial temperature.
    pub fn root(bbox: IntervalBox, schedule: &TemperatureSchedule) -> Self {
        Self {
            bbox,
            depth: 0,
            temperature: schedule.initial_temperature,
            goal_bounds: None,
        }
    }

    pub fn new(bbox: IntervalBox, depth: usize, temperature: f64) -> Self {
        Self {
            bbox,
            depth,
            temperature,
            goal_bounds: None,
        }
    }

    /// Cached lower bound of the objective, `-inf` when unknown.
    pub fn lower_bound(&self) -> f64 {
        match self.goal_bounds {
            Some(g) if !g.is_empty() => g.lo(),
            _ => f64::NEG_INFINITY,
        }
    }

    /// Splits the widest dimension, handing the given temperatures to the
    /// (left, right) children. Cached bounds are not inherited.
    pub fn split(self, (t_left, t_right): (f64, f64)) -> (Node, Node) {
        let (left, right) = self.bbox.split_widest();
        let depth = self.depth + 1;
        (Node::new(left, depth, t_left), Node::new(right, depth, t_right))
    }

    /// Splits using the schedule's decay with factor `k_eff`.
    pub fn split_with<R: Rng + ?Sized>(
        self,
        schedule: &TemperatureSchedule,
        k_eff: f64,
        rng: &mut R,
    ) -> (Node, Node) {
        let temps = schedule.split_temperatures(self.temperature, k_eff, rng);
        self.split(temps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_root() {
        let s = TemperatureSchedule::default().with_initial_temperature(42.0);
        let n = Node::root(IntervalBox::cube(2, 0.0, 1.0), &s);
        assert_eq!(n.depth, 0);
        assert_eq!(n.temperature, 42.0);
        assert!(n.goal_bounds.is_none());
        assert_eq!(n.lower_bound(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_split_depth_and_temperature() {
        let s = TemperatureSchedule::default()
            .with_initial_temperature(16.0)
            .with_k(0.5);
        let mut rng = create_rng(0);
        let mut n = Node::root(IntervalBox::cube(2, 0.0, 8.0), &s);
        n.goal_bounds = Some(Interval::new(1.0, 2.0));

        let (l, r) = n.clone().split_with(&s, s.k, &mut rng);
        assert_eq!(l.depth, 1);
        assert_eq!(r.depth, 1);
        assert_eq!(l.temperature, 4.0);
        assert_eq!(r.temperature, 4.0);
        assert!(l.goal_bounds.is_none());
        assert!(l.bbox.is_subset(&n.bbox));
        assert!(r.bbox.is_subset(&n.bbox));
        assert_eq!(l.bbox[0].lo(), n.bbox[0].lo());
    }

    #[test]
    fn test_temperature_along_path() {
        let s = TemperatureSchedule::default()
            .with_initial_temperature(100.0)
            .with_k(0.8);
        let mut rng = create_rng(0);
        let mut n = Node::root(IntervalBox::cube(3, -1.0, 1.0), &s);
        for _ in 0..10 {
            let (l, _) = n.split_with(&s, s.k, &mut rng);
            n = l;
        }
        let expected = 100.0 * (0.8f64 / 2.0).powi(10);
        assert!((n.temperature - expected).abs() < 1e-12);
        assert_eq!(n.depth, 10);
    }

    #[test]
    fn test_lower_bound_ignores_empty_cache() {
        let mut n = Node::new(IntervalBox::cube(1, 0.0, 1.0), 3, 0.0);
        n.goal_bounds = Some(Interval::EMPTY);
        assert_eq!(n.lower_bound(), f64::NEG_INFINITY);
        n.goal_bounds = Some(Interval::new(-2.0, 5.0));
        assert_eq!(n.lower_bound(), -2.0);
    }
}
