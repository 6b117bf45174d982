//! Best-first optimizer configuration.

use crate::buffer::BufferConfig;
use crate::error::FdError;
use crate::node::TemperatureSchedule;
use std::time::Duration;

/// Configuration for [`BestFirstRunner`](super::BestFirstRunner).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_fdive::bestfirst::BestFirstConfig;
/// use u_fdive::buffer::BufferConfig;
///
/// let config = BestFirstConfig::default()
///     .with_buffer(BufferConfig::default().with_depth_cut(20))
///     .with_abs_eps_f(1e-6)
///     .with_timeout(Duration::from_secs(5));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BestFirstConfig {
    /// Node buffer parameters.
    pub buffer: BufferConfig,

    /// Temperature inheritance at splits.
    pub schedule: TemperatureSchedule,

    /// Boxes narrower than this are not split further; their lower bound
    /// is kept for the final bound.
    pub eps_box: f64,

    /// Absolute optimality gap: the search stops once
    /// `minimum >= loup - abs_eps_f`, and nodes with `lb >= loup - abs_eps_f`
    /// are dropped.
    pub abs_eps_f: f64,

    /// Hard budget on processed nodes.
    pub max_nodes: usize,

    /// Wall-clock limit, checked between nodes.
    pub timeout: Option<Duration>,

    /// Known upper bound to start from (`+inf` for none).
    pub initial_loup: f64,

    /// Seed for randomized schedules (None for random).
    pub seed: Option<u64>,
}

impl Default for BestFirstConfig {
    fn default() -> Self {
        Self {
            buffer: BufferConfig::default(),
            schedule: TemperatureSchedule::default(),
            eps_box: 1e-9,
            abs_eps_f: 1e-7,
            max_nodes: 1_000_000,
            timeout: None,
            initial_loup: f64::INFINITY,
            seed: None,
        }
    }
}

impl BestFirstConfig {
    pub fn with_buffer(mut self, buffer: BufferConfig) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_schedule(mut self, schedule: TemperatureSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_eps_box(mut self, eps: f64) -> Self {
        self.eps_box = eps;
        self
    }

    pub fn with_abs_eps_f(mut self, eps: f64) -> Self {
        self.abs_eps_f = eps;
        self
    }

    pub fn with_max_nodes(mut self, n: usize) -> Self {
        self.max_nodes = n;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_initial_loup(mut self, loup: f64) -> Self {
        self.initial_loup = loup;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), FdError> {
        if !self.eps_box.is_finite() || self.eps_box < 0.0 {
            return Err(FdError::invalid(
                "eps_box",
                format!("must be finite and >= 0, got {}", self.eps_box),
            ));
        }
        if !self.abs_eps_f.is_finite() || self.abs_eps_f < 0.0 {
            return Err(FdError::invalid(
                "abs_eps_f",
                format!("must be finite and >= 0, got {}", self.abs_eps_f),
            ));
        }
        if self.max_nodes == 0 {
            return Err(FdError::invalid("max_nodes", "must be positive"));
        }
        if self.initial_loup.is_nan() {
            return Err(FdError::invalid("initial_loup", "must not be NaN"));
        }
        self.schedule.validate()?;
        self.buffer.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let c = BestFirstConfig::default();
        assert_eq!(c.max_nodes, 1_000_000);
        assert_eq!(c.initial_loup, f64::INFINITY);
        assert!(c.timeout.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(BestFirstConfig::default().with_eps_box(-1.0).validate().is_err());
        assert!(BestFirstConfig::default().with_abs_eps_f(f64::NAN).validate().is_err());
        assert!(BestFirstConfig::default().with_max_nodes(0).validate().is_err());
        assert!(BestFirstConfig::default()
            .with_initial_loup(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_checks_children() {
        let c = BestFirstConfig::default().with_buffer(BufferConfig::default().with_bias(-1.0));
        assert!(c.validate().is_err());
        let c = BestFirstConfig::default()
            .with_schedule(TemperatureSchedule::default().with_initial_temperature(-1.0));
        assert!(c.validate().is_err());
    }
}
