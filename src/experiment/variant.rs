//! Named variant catalogue.

use crate::bnb::BnbConfig;
use crate::dive::{DiveConfig, SelectionPolicy};
use crate::error::FdError;
use crate::node::{Randomization, TemperatureSchedule};
use std::fmt;
use std::str::FromStr;

/// One of the ten benchmarked configurations.
///
/// Each variant is a driver (a single dive, or stack B&B with a dive per
/// node), a [`SelectionPolicy`], and a [`Randomization`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Variant {
    Base,
    BaseBb,
    DepthK,
    DepthKBb,
    DepthKRand,
    DepthKRandBb,
    VolK,
    VolKBb,
    VolKRand,
    VolKRandBb,
}

impl Variant {
    /// Every variant, in catalogue order.
    pub const ALL: [Variant; 10] = [
        Variant::Base,
        Variant::BaseBb,
        Variant::DepthK,
        Variant::DepthKBb,
        Variant::DepthKRand,
        Variant::DepthKRandBb,
        Variant::VolK,
        Variant::VolKBb,
        Variant::VolKRand,
        Variant::VolKRandBb,
    ];

    /// CSV label.
    pub fn label(self) -> &'static str {
        match self {
            Variant::Base => "base",
            Variant::BaseBb => "base_bb",
            Variant::DepthK => "depth_k",
            Variant::DepthKBb => "depth_k_bb",
            Variant::DepthKRand => "depth_k_rand",
            Variant::DepthKRandBb => "depth_k_rand_bb",
            Variant::VolK => "vol_k",
            Variant::VolKBb => "vol_k_bb",
            Variant::VolKRand => "vol_k_rand",
            Variant::VolKRandBb => "vol_k_rand_bb",
        }
    }

    /// `true` for the stack B&B drivers.
    pub fn is_bnb(self) -> bool {
        matches!(
            self,
            Variant::BaseBb
                | Variant::DepthKBb
                | Variant::DepthKRandBb
                | Variant::VolKBb
                | Variant::VolKRandBb
        )
    }

    pub fn is_randomized(self) -> bool {
        matches!(
            self,
            Variant::DepthKRand | Variant::DepthKRandBb | Variant::VolKRand | Variant::VolKRandBb
        )
    }

    /// Label reported when the unbounded-root fallback was taken; `None`
    /// for variants without one.
    pub fn fallback_label(self) -> Option<&'static str> {
        match self {
            Variant::DepthK => Some("base_depth_fallback"),
            Variant::DepthKRand => Some("base_depth_rand_fallback"),
            _ => None,
        }
    }

    fn selection(self, params: &VariantParams) -> SelectionPolicy {
        match self {
            Variant::Base | Variant::BaseBb => SelectionPolicy::None,
            Variant::DepthK | Variant::DepthKRand => SelectionPolicy::DepthBudget {
                d_max: params.d_max,
            },
            Variant::DepthKBb | Variant::DepthKRandBb => SelectionPolicy::DepthBudget {
                d_max: params.bb_dive_d_max,
            },
            Variant::VolK | Variant::VolKBb | Variant::VolKRand | Variant::VolKRandBb => {
                SelectionPolicy::VolumeRatio {
                    eps_v: params.eps_v,
                    beta: params.beta,
                }
            }
        }
    }

    fn schedule(self, params: &VariantParams) -> TemperatureSchedule {
        let t0 = match self {
            Variant::Base | Variant::BaseBb => 0.0,
            _ => params.initial_temperature,
        };
        let randomization = if self.is_randomized() {
            Randomization::PerChildUniform
        } else {
            Randomization::Deterministic
        };
        TemperatureSchedule::default()
            .with_initial_temperature(t0)
            .with_k(params.k)
            .with_randomization(randomization)
    }

    /// Dive configuration of this variant (the per-node dive for B&B variants).
    pub fn dive_config(self, params: &VariantParams) -> DiveConfig {
        DiveConfig::default()
            .with_eps_box(params.eps_box)
            .with_max_iterations(params.max_iterations)
            .with_selection(self.selection(params))
            .with_schedule(self.schedule(params))
    }

    /// Stack B&B configuration of this variant.
    pub fn bnb_config(self, params: &VariantParams) -> BnbConfig {
        let max_bb_nodes = match self {
            Variant::BaseBb => params.base_bb_max_nodes,
            _ => params.max_bb_nodes,
        };
        BnbConfig::default()
            .with_dive(self.dive_config(params))
            .with_max_bb_nodes(max_bb_nodes)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Variant {
    type Err = FdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.label() == s)
            .ok_or_else(|| FdError::UnknownVariant(s.to_string()))
    }
}

/// Shared parameters of the variant catalogue.
///
/// # Examples
///
/// ```
/// use u_fdive::experiment::{Variant, VariantParams};
///
/// let params = VariantParams::default().with_eps_box(1e-6);
/// let dive = Variant::VolKRand.dive_config(&params);
/// assert_eq!(dive.label(), "vol_k_rand");
/// assert_eq!(Variant::DepthKBb.bnb_config(&params).label(), "depth_k_bb");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariantParams {
    pub eps_box: f64,

    /// Iteration budget of every dive.
    pub max_iterations: usize,

    /// Root temperature of the thermal variants (`base*` always use 0).
    pub initial_temperature: f64,

    pub k: f64,

    /// Depth budget of standalone depth dives.
    pub d_max: usize,

    /// Depth budget of the dives launched inside depth B&B.
    pub bb_dive_d_max: usize,

    pub eps_v: f64,
    pub beta: f64,

    /// Node budget of the thermal B&B variants.
    pub max_bb_nodes: usize,

    /// Node budget of `base_bb`.
    pub base_bb_max_nodes: usize,
}

impl Default for VariantParams {
    fn default() -> Self {
        Self {
            eps_box: 1e-9,
            max_iterations: 100_000,
            initial_temperature: 10.0,
            k: 0.5,
            d_max: 100,
            bb_dive_d_max: 50,
            eps_v: 1e-4,
            beta: 0.1,
            max_bb_nodes: 1_000_000,
            base_bb_max_nodes: 5_000_000,
        }
    }
}

impl VariantParams {
    pub fn with_eps_box(mut self, eps: f64) -> Self {
        self.eps_box = eps;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_initial_temperature(mut self, t0: f64) -> Self {
        self.initial_temperature = t0;
        self
    }

    pub fn with_k(mut self, k: f64) -> Self {
        self.k = k;
        self
    }

    pub fn with_d_max(mut self, d_max: usize) -> Self {
        self.d_max = d_max;
        self
    }

    pub fn with_bb_dive_d_max(mut self, d_max: usize) -> Self {
        self.bb_dive_d_max = d_max;
        self
    }

    pub fn with_volume(mut self, eps_v: f64, beta: f64) -> Self {
        self.eps_v = eps_v;
        self.beta = beta;
        self
    }

    /// Sets the node budget of every B&B variant, `base_bb` included.
    pub fn with_max_bb_nodes(mut self, n: usize) -> Self {
        self.max_bb_nodes = n;
        self.base_bb_max_nodes = n;
        self
    }
}
