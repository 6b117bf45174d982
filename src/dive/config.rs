//! Diving configuration and stopping policies.

use crate::error::FdError;
use crate::node::{Randomization, TemperatureSchedule};

/// Extra stopping/pacing rule applied on top of the precision stop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionPolicy {
    /// Only the precision stop (`max_diam < eps_box`) applies.
    #[default]
    None,

    /// Soft depth budget.
    ///
    /// When the dive's depth (relative to where it started) reaches the
    /// budget, the budget is extended by `d_max` and the dive continues.
    /// The budget paces the dive; it never stops it.
    DepthBudget {
        /// Budget increment, also the initial budget for a dive at depth 0.
        d_max: usize,
    },

    /// Relative-volume cutoff.
    ///
    /// After the warm-up, the dive stops once
    /// `V / V0 <= eps_v * exp(-beta * d)`, where `V0` is the volume of the
    /// box the dive started from and `d` the depth relative to that box.
    /// Compared in log space; disabled when `V0` is infinite or zero.
    VolumeRatio {
        /// Threshold at `d = 0`.
        eps_v: f64,
        /// Exponential decay of the threshold with depth.
        beta: f64,
    },
}

/// Configuration of a single dive.
///
/// # Examples
///
/// ```
/// use u_fdive::dive::{DiveConfig, SelectionPolicy};
///
/// let config = DiveConfig::default()
///     .with_eps_box(1e-6)
///     .with_max_iterations(10_000)
///     .with_selection(SelectionPolicy::VolumeRatio { eps_v: 1e-4, beta: 0.1 })
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.label(), "vol_k");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiveConfig {
    /// Precision: the dive stops once every width is below this (and it
    /// has descended at least one level).
    pub eps_box: f64,

    /// Hard budget on loop iterations.
    pub max_iterations: usize,

    /// Depth/volume policy.
    pub selection: SelectionPolicy,

    /// Temperature inheritance and noise.
    pub schedule: TemperatureSchedule,

    /// Half-width of the uniform integer jitter applied once to `d_max`
    /// in randomized dives.
    pub depth_jitter: usize,

    /// Relative half-width of the uniform factor applied once to the
    /// volume threshold in randomized dives. Must be in `[0, 1)`.
    pub volume_jitter: f64,

    /// Number of levels a dive descends before the volume cutoff is checked.
    pub volume_warmup: usize,

    /// Random seed for standalone dives (None for random).
    pub seed: Option<u64>,
}

impl Default for DiveConfig {
    fn default() -> Self {
        Self {
            eps_box: 1e-9,
            max_iterations: 100_000,
            selection: SelectionPolicy::None,
            schedule: TemperatureSchedule::default(),
            depth_jitter: 10,
            volume_jitter: 0.3,
            volume_warmup: 5,
            seed: None,
        }
    }
}

impl DiveConfig {
    pub fn with_eps_box(mut self, eps: f64) -> Self {
        self.eps_box = eps;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_schedule(mut self, schedule: TemperatureSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_depth_jitter(mut self, jitter: usize) -> Self {
        self.depth_jitter = jitter;
        self
    }

    pub fn with_volume_jitter(mut self, jitter: f64) -> Self {
        self.volume_jitter = jitter;
        self
    }

    pub fn with_volume_warmup(mut self, levels: usize) -> Self {
        self.volume_warmup = levels;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Variant label of this dive, e.g. `depth_k_rand`.
    pub fn label(&self) -> &'static str {
        let randomized = self.schedule.randomization == Randomization::PerChildUniform;
        match (self.selection, randomized) {
            (SelectionPolicy::None, false) => "base",
            (SelectionPolicy::None, true) => "base_rand",
            (SelectionPolicy::DepthBudget { .. }, false) => "depth_k",
            (SelectionPolicy::DepthBudget { .. }, true) => "depth_k_rand",
            (SelectionPolicy::VolumeRatio { .. }, false) => "vol_k",
            (SelectionPolicy::VolumeRatio { .. }, true) => "vol_k_rand",
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), FdError> {
        if !self.eps_box.is_finite() || self.eps_box < 0.0 {
            return Err(FdError::invalid(
                "eps_box",
                format!("must be finite and >= 0, got {}", self.eps_box),
            ));
        }
        if self.max_iterations == 0 {
            return Err(FdError::invalid("max_iterations", "must be positive"));
        }
        if !(0.0..1.0).contains(&self.volume_jitter) {
            return Err(FdError::invalid(
                "volume_jitter",
                format!("must be in [0, 1), got {}", self.volume_jitter),
            ));
        }
        match self.selection {
            SelectionPolicy::None => {}
            SelectionPolicy::DepthBudget { d_max } => {
                if d_max == 0 {
                    return Err(FdError::invalid("d_max", "must be positive"));
                }
            }
            SelectionPolicy::VolumeRatio { eps_v, beta } => {
                if !eps_v.is_finite() || eps_v <= 0.0 {
                    return Err(FdError::invalid(
                        "eps_v",
                        format!("must be finite and positive, got {eps_v}"),
                    ));
                }
                if !beta.is_finite() || beta < 0.0 {
                    return Err(FdError::invalid(
                        "beta",
                        format!("must be finite and >= 0, got {beta}"),
                    ));
                }
            }
        }
        self.schedule.validate()
    }
}
