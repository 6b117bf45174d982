//! Temperature schedule shared by diving, stack B&B and the priority buffer.

use crate::error::FdError;
use rand::Rng;

/// Weight of the relative incumbent improvement in [`adaptive_k`].
pub const ADAPTIVE_ALPHA: f64 = 0.5;

/// Guards the relative improvement against a zero previous incumbent.
pub const ADAPTIVE_EPS: f64 = 1e-12;

/// Decay factor boosted by recent incumbent progress.
///
/// `k_eff = k_base * (1 + 0.5 * (ub_prev - ub_new) / (|ub_prev| + 1e-12))`
/// when `ub_new < ub_prev` and both are finite, otherwise `k_base`.
///
/// # Examples
///
/// ```
/// use u_fdive::node::adaptive_k;
///
/// assert_eq!(adaptive_k(0.5, 10.0, 10.0), 0.5);
/// assert_eq!(adaptive_k(0.5, f64::INFINITY, 3.0), 0.5);
/// assert!(adaptive_k(0.5, 10.0, 5.0) > 0.5);
/// ```
pub fn adaptive_k(k_base: f64, ub_prev: f64, ub_new: f64) -> f64 {
    if !ub_prev.is_finite() || !ub_new.is_finite() || ub_new >= ub_prev {
        return k_base;
    }
    let rel = (ub_prev - ub_new) / (ub_prev.abs() + ADAPTIVE_EPS);
    k_base * (1.0 + ADAPTIVE_ALPHA * rel)
}

/// How child temperatures are perturbed at a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Randomization {
    /// Both children receive `k_eff * T / 2`.
    #[default]
    Deterministic,
    /// Each child's temperature is additionally multiplied by an
    /// independent uniform draw in `[0, 1)`.
    PerChildUniform,
}

/// Inherited temperature parameters.
///
/// The root carries `initial_temperature`; each split hands
/// `k_eff * T_parent / 2` to the children, so along a path with constant
/// `k` the temperature at depth `d` is `T0 * (k / 2)^d`.
///
/// # Examples
///
/// ```
/// use u_fdive::node::{Randomization, TemperatureSchedule};
///
/// let schedule = TemperatureSchedule::default()
///     .with_initial_temperature(10.0)
///     .with_k(0.5)
///     .with_randomization(Randomization::PerChildUniform);
/// assert!(schedule.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemperatureSchedule {
    /// Root temperature `T0`. Zero disables the thermal term entirely.
    pub initial_temperature: f64,

    /// Nominal decay factor `k`.
    pub k: f64,

    /// Noise applied to child temperatures.
    pub randomization: Randomization,
}

impl Default for TemperatureSchedule {
    fn default() -> Self {
        Self {
            initial_temperature: 10.0,
            k: 0.5,
            randomization: Randomization::Deterministic,
        }
    }
}

impl TemperatureSchedule {
    /// A schedule whose temperatures are identically zero.
    pub fn cold() -> Self {
        Self {
            initial_temperature: 0.0,
            ..Self::default()
        }
    }

    pub fn with_initial_temperature(mut self, t0: f64) -> Self {
        self.initial_temperature = t0;
        self
    }

    pub fn with_k(mut self, k: f64) -> Self {
        self.k = k;
        self
    }

    pub fn with_randomization(mut self, randomization: Randomization) -> Self {
        self.randomization = randomization;
        self
    }

    /// `true` if child temperatures carry per-child noise.
    pub fn is_randomized(&self) -> bool {
        self.randomization == Randomization::PerChildUniform
    }

    /// Effective decay factor after an incumbent move from `ub_prev` to `ub_new`.
    pub fn k_eff(&self, ub_prev: f64, ub_new: f64) -> f64 {
        adaptive_k(self.k, ub_prev, ub_new)
    }

    /// Noise-free child temperature `k_eff * T / 2`.
    #[inline]
    pub fn child_temperature(&self, parent: f64, k_eff: f64) -> f64 {
        k_eff * parent / 2.0
    }

    /// Temperatures handed to the (left, right) children of a split.
    ///
    /// The deterministic schedule does not touch `rng`. The randomized one
    /// draws the left multiplier first, then the right one.
    pub fn split_temperatures<R: Rng + ?Sized>(
        &self,
        parent: f64,
        k_eff: f64,
        rng: &mut R,
    ) -> (f64, f64) {
        let base = self.child_temperature(parent, k_eff);
        match self.randomization {
            Randomization::Deterministic => (base, base),
            Randomization::PerChildUniform => {
                let r_left: f64 = rng.random();
                let r_right: f64 = rng.random();
                (base * r_left, base * r_right)
            }
        }
    }

    /// Validates the schedule.
    pub fn validate(&self) -> Result<(), FdError> {
        if !self.initial_temperature.is_finite() || self.initial_temperature < 0.0 {
            return Err(FdError::invalid(
                "initial_temperature",
                format!("must be finite and >= 0, got {}", self.initial_temperature),
            ));
        }
        if !self.k.is_finite() || self.k < 0.0 {
            return Err(FdError::invalid(
                "k",
                format!("must be finite and >= 0, got {}", self.k),
            ));
        }
        Ok(())
    }
}
