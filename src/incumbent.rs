//! Best known upper bound on the optimum.

/// Absolute tolerance of the bound test in [`Incumbent::prunes`].
pub const PRUNE_TOLERANCE: f64 = 1e-12;

/// Run-scoped incumbent `UB`.
///
/// The value only ever decreases. Non-finite candidates carry no
/// information and are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Incumbent {
    value: f64,
    found: bool,
}

impl Default for Incumbent {
    fn default() -> Self {
        Self::new()
    }
}

impl Incumbent {
    /// No incumbent yet (`UB = +inf`).
    pub fn new() -> Self {
        Self {
            value: f64::INFINITY,
            found: false,
        }
    }

    /// Starts from a hint. A non-finite hint behaves like [`new`](Self::new).
    pub fn with_hint(hint: f64) -> Self {
        let mut inc = Self::new();
        inc.offer(hint);
        inc
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// `true` once a finite value has been accepted.
    #[inline]
    pub fn has_value(&self) -> bool {
        self.found
    }

    /// Tightens the incumbent. Returns `true` if `candidate` was accepted.
    pub fn offer(&mut self, candidate: f64) -> bool {
        if candidate.is_finite() && candidate < self.value {
            self.value = candidate;
            self.found = true;
            true
        } else {
            false
        }
    }

    /// `true` if a box whose objective is bounded below by `lower_bound`
    /// cannot improve the incumbent by more than `tolerance`.
    ///
    /// Never prunes before a finite incumbent exists, nor on a NaN bound.
    pub fn prunes(&self, lower_bound: f64, tolerance: f64) -> bool {
        self.found && !lower_bound.is_nan() && lower_bound >= self.value - tolerance
    }
}
