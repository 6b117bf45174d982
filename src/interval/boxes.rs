//! Axis-aligned boxes: one interval per decision variable.

use super::scalar::Interval;
use std::fmt;
use std::ops::{Index, IndexMut};

/// An ordered tuple of closed intervals.
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntervalBox {
    dims: Vec<Interval>,
}

impl IntervalBox {
    pub fn new(dims: Vec<Interval>) -> Self {
        Self { dims }
    }

    /// Builds a box from `(lo, hi)` pairs.
    pub fn from_bounds(bounds: &[(f64, f64)]) -> Self {
        Self {
            dims: bounds.iter().map(|&b| Interval::from(b)).collect(),
        }
    }

    /// `[lo, hi]^n`.
    pub fn cube(n: usize, lo: f64, hi: f64) -> Self {
        Self {
            dims: vec![Interval::new(lo, hi); n],
        }
    }

    /// Number of dimensions.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dims.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.dims.iter()
    }

    /// `true` if any component is empty.
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(Interval::is_empty)
    }

    /// Marks every component empty.
    pub fn set_empty(&mut self) {
        for d in &mut self.dims {
            *d = Interval::EMPTY;
        }
    }

    /// `true` if some bound is infinite.
    pub fn is_unbounded(&self) -> bool {
        self.dims
            .iter()
            .any(|d| !d.is_empty() && !(d.lo().is_finite() && d.hi().is_finite()))
    }

    /// Dimensionality and finiteness check: `expected_dim` components, all
    /// bounds finite, `lo <= hi` everywhere.
    pub fn is_valid(&self, expected_dim: usize) -> bool {
        self.dims.len() == expected_dim && self.dims.iter().all(Interval::is_bounded)
    }

    /// Largest width over all dimensions (`0` for a zero-dimensional box).
    pub fn max_diam(&self) -> f64 {
        self.dims.iter().map(Interval::diam).fold(0.0, f64::max)
    }

    /// Index of the first dimension with the largest width.
    pub fn widest_dim(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, d) in self.dims.iter().enumerate() {
            let w = d.diam();
            match best {
                None => best = Some((i, w)),
                Some((_, bw)) if w > bw => best = Some((i, w)),
                _ => {}
            }
        }
        best.map(|(i, _)| i)
    }

    /// Component-wise midpoint.
    pub fn midpoint(&self) -> Vec<f64> {
        self.dims.iter().map(Interval::mid).collect()
    }

    /// Product of the widths. Zero for an empty box.
    pub fn volume(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.dims.iter().map(Interval::diam).product()
    }

    /// Sum of log-widths.
    ///
    /// Stays finite in high dimension where [`volume`](Self::volume)
    /// underflows. `+inf` for unbounded boxes, `-inf` for empty or flat ones.
    pub fn log_volume(&self) -> f64 {
        if self.is_empty() {
            return f64::NEG_INFINITY;
        }
        self.dims.iter().map(|d| d.diam().ln()).sum()
    }

    /// Splits dimension `var` at `point`. The left box keeps the parent's
    /// lower bound.
    pub fn split_at(&self, var: usize, point: f64) -> (IntervalBox, IntervalBox) {
        let mut left = self.clone();
        let mut right = self.clone();
        let d = self.dims[var];
        left.dims[var] = Interval::new(d.lo(), point);
        right.dims[var] = Interval::new(point, d.hi());
        (left, right)
    }

    /// Splits the widest dimension at its midpoint.
    ///
    /// The two halves share the split plane and their union is `self`.
    /// A zero-dimensional box yields two copies of itself.
    pub fn split_widest(&self) -> (IntervalBox, IntervalBox) {
        match self.widest_dim() {
            Some(var) => self.split_at(var, self.dims[var].mid()),
            None => (self.clone(), self.clone()),
        }
    }

    /// `true` if every component of `self` lies inside the matching
    /// component of `other`.
    pub fn is_subset(&self, other: &IntervalBox) -> bool {
        self.dims.len() == other.dims.len()
            && self
                .dims
                .iter()
                .zip(&other.dims)
                .all(|(a, b)| a.is_subset(b))
    }

    pub fn contains_point(&self, x: &[f64]) -> bool {
        x.len() == self.dims.len() && self.dims.iter().zip(x).all(|(d, &v)| d.contains(v))
    }
}

impl Index<usize> for IntervalBox {
    type Output = Interval;

    fn index(&self, i: usize) -> &Interval {
        &self.dims[i]
    }
}

impl IndexMut<usize> for IntervalBox {
    fn index_mut(&mut self, i: usize) -> &mut Interval {
        &mut self.dims[i]
    }
}

impl fmt::Debug for IntervalBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for IntervalBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, " ; ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, ")")
    }
}
