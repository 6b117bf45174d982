//! Stack branch-and-bound configuration.

use crate::dive::DiveConfig;
use crate::error::FdError;
use crate::incumbent::PRUNE_TOLERANCE;

/// Configuration for [`BnbRunner`](super::BnbRunner).
///
/// The embedded [`DiveConfig`] drives the dive launched from every
/// processed node and also supplies the temperature schedule used when
/// expanding nodes.
///
/// # Examples
///
/// ```
/// use u_fdive::bnb::BnbConfig;
/// use u_fdive::dive::{DiveConfig, SelectionPolicy};
///
/// let config = BnbConfig::default()
///     .with_dive(
///         DiveConfig::default().with_selection(SelectionPolicy::DepthBudget { d_max: 50 }),
///     )
///     .with_max_bb_nodes(10_000);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.label(), "depth_k_bb");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BnbConfig {
    /// Dive launched from each processed node.
    pub dive: DiveConfig,

    /// Stop after this many nodes have been dived from and expanded.
    pub max_bb_nodes: usize,

    /// Empty or invalid nodes shallower than this are split anyway.
    pub min_force_depth: usize,

    /// Absolute tolerance of the bound test.
    pub prune_tolerance: f64,

    /// Upper bound known before the search (`+inf` for none).
    pub initial_ub: f64,
}

impl Default for BnbConfig {
    fn default() -> Self {
        Self {
            dive: DiveConfig::default(),
            max_bb_nodes: 1_000_000,
            min_force_depth: 3,
            prune_tolerance: PRUNE_TOLERANCE,
            initial_ub: f64::INFINITY,
        }
    }
}

impl BnbConfig {
    pub fn with_dive(mut self, dive: DiveConfig) -> Self {
        self.dive = dive;
        self
    }

    pub fn with_max_bb_nodes(mut self, n: usize) -> Self {
        self.max_bb_nodes = n;
        self
    }

    pub fn with_min_force_depth(mut self, depth: usize) -> Self {
        self.min_force_depth = depth;
        self
    }

    pub fn with_prune_tolerance(mut self, tol: f64) -> Self {
        self.prune_tolerance = tol;
        self
    }

    pub fn with_initial_ub(mut self, ub: f64) -> Self {
        self.initial_ub = ub;
        self
    }

    /// Sets the seed of the underlying dive configuration.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.dive.seed = Some(seed);
        self
    }

    /// Variant label, the dive label with a `_bb` suffix.
    pub fn label(&self) -> String {
        format!("{}_bb", self.dive.label())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), FdError> {
        if self.max_bb_nodes == 0 {
            return Err(FdError::invalid("max_bb_nodes", "must be positive"));
        }
        if !self.prune_tolerance.is_finite() || self.prune_tolerance < 0.0 {
            return Err(FdError::invalid(
                "prune_tolerance",
                format!("must be finite and >= 0, got {}", self.prune_tolerance),
            ));
        }
        if self.initial_ub.is_nan() {
            return Err(FdError::invalid("initial_ub", "must not be NaN"));
        }
        self.dive.validate()
    }
}
