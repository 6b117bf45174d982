//! Priority buffer parameters.

use crate::error::FdError;
use crate::interval::IntervalBox;

/// Parameters of [`TempBuffer`](super::TempBuffer).
///
/// The score of a node is `bound + bias / (1 + T)` (plus optional tie
/// noise), lower is better. `T` is the node's own temperature when it is
/// positive and finite, otherwise it is rebuilt from the depth as
/// `initial_temperature * (k / 2)^depth`.
///
/// Cutoffs only drive the trigger counters; they never reorder or drop
/// nodes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferConfig {
    /// Decay factor used when a temperature has to be rebuilt from depth.
    pub k: f64,

    /// Weight of the thermal tie-break.
    pub bias: f64,

    /// Root temperature used when rebuilding temperatures.
    pub initial_temperature: f64,

    /// Depth at or beyond which a push counts as a depth trigger (0 disables).
    pub depth_cut: usize,

    /// Volume ratio at or below which a push counts as a volume trigger
    /// (0 disables).
    pub vol_ratio_cut: f64,

    /// Reference volume for `vol_ratio_cut`, usually the root box volume.
    pub reference_volume: f64,

    /// Relative jitter of `depth_cut`, keyed by depth.
    pub depth_cut_jitter: f64,

    /// Relative jitter of `vol_ratio_cut`, keyed by depth.
    pub vol_cut_jitter: f64,

    /// Amplitude of the deterministic score perturbation (0 disables).
    pub tie_noise: f64,

    /// Multiply `k` by a depth-keyed noise factor when rebuilding temperatures.
    pub rand_k: bool,

    /// Seed of all depth-keyed noise.
    pub seed: u64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            k: 10.0,
            bias: 1e-3,
            initial_temperature: 100.0,
            depth_cut: 0,
            vol_ratio_cut: 0.0,
            reference_volume: 1.0,
            depth_cut_jitter: 0.0,
            vol_cut_jitter: 0.0,
            tie_noise: 0.0,
            rand_k: false,
            seed: 1,
        }
    }
}

impl BufferConfig {
    pub fn with_k(mut self, k: f64) -> Self {
        self.k = k;
        self
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_initial_temperature(mut self, t0: f64) -> Self {
        self.initial_temperature = t0;
        self
    }

    pub fn with_depth_cut(mut self, depth: usize) -> Self {
        self.depth_cut = depth;
        self
    }

    pub fn with_vol_ratio_cut(mut self, ratio: f64) -> Self {
        self.vol_ratio_cut = ratio;
        self
    }

    pub fn with_reference_volume(mut self, volume: f64) -> Self {
        self.reference_volume = volume;
        self
    }

    /// Uses the volume of `bbox` as the reference volume.
    pub fn with_reference_box(mut self, bbox: &IntervalBox) -> Self {
        self.reference_volume = bbox.volume();
        self
    }

    pub fn with_depth_cut_jitter(mut self, rel: f64) -> Self {
        self.depth_cut_jitter = rel;
        self
    }

    pub fn with_vol_cut_jitter(mut self, rel: f64) -> Self {
        self.vol_cut_jitter = rel;
        self
    }

    pub fn with_tie_noise(mut self, amplitude: f64) -> Self {
        self.tie_noise = amplitude;
        self
    }

    pub fn with_rand_k(mut self, enabled: bool) -> Self {
        self.rand_k = enabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validates the configuration.
    ///
    /// `reference_volume` is only checked when the volume cutoff is
    /// enabled; an unbounded reference simply disables volume triggers.
    pub fn validate(&self) -> Result<(), FdError> {
        let non_negative = [
            ("k", self.k),
            ("bias", self.bias),
            ("initial_temperature", self.initial_temperature),
            ("vol_ratio_cut", self.vol_ratio_cut),
            ("depth_cut_jitter", self.depth_cut_jitter),
            ("vol_cut_jitter", self.vol_cut_jitter),
            ("tie_noise", self.tie_noise),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(FdError::invalid(
                    field,
                    format!("must be finite and >= 0, got {value}"),
                ));
            }
        }
        if self.k == 0.0 {
            return Err(FdError::invalid("k", "must be positive"));
        }
        let bad_reference = self.reference_volume.is_nan() || self.reference_volume <= 0.0;
        if self.vol_ratio_cut > 0.0 && bad_reference {
            return Err(FdError::invalid(
                "reference_volume",
                format!("must be positive, got {}", self.reference_volume),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let c = BufferConfig::default();
        assert_eq!(c.k, 10.0);
        assert_eq!(c.bias, 1e-3);
        assert_eq!(c.initial_temperature, 100.0);
        assert_eq!(c.depth_cut, 0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_reference_box() {
        let b = IntervalBox::from_bounds(&[(0.0, 2.0), (0.0, 3.0)]);
        let c = BufferConfig::default().with_reference_box(&b);
        assert_eq!(c.reference_volume, 6.0);
    }

    #[test]
    fn test_validate_negative_fields() {
        assert!(BufferConfig::default().with_bias(-1.0).validate().is_err());
        assert!(BufferConfig::default().with_k(0.0).validate().is_err());
        assert!(BufferConfig::default().with_tie_noise(f64::NAN).validate().is_err());
        assert!(BufferConfig::default()
            .with_initial_temperature(f64::INFINITY)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_reference_volume() {
        let c = BufferConfig::default()
            .with_vol_ratio_cut(0.1)
            .with_reference_volume(0.0);
        assert!(c.validate().is_err());
        // ignored while the cutoff is off
        let c = BufferConfig::default().with_reference_volume(0.0);
        assert!(c.validate().is_ok());
        // unbounded reference is allowed and disables volume triggers
        let c = BufferConfig::default()
            .with_vol_ratio_cut(0.1)
            .with_reference_volume(f64::INFINITY);
        assert!(c.validate().is_ok());
    }
}
