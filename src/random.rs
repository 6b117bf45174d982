//! Seeded randomness.
//!
//! Two sources are used: a seeded [`StdRng`] for per-child temperature
//! draws and budget jitter, and a stateless splitmix-style hash that maps
//! `(seed, depth)` to a multiplier in `[0.5, 1.5)`. The hash lets the
//! priority buffer jitter its cutoffs without carrying generator state.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Base seed added to the run index for randomized variants.
pub const RUN_SEED_BASE: u64 = 123_456;

/// Creates a deterministic generator from a seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Generator for run number `run_id` of an experiment.
pub fn run_rng(run_id: usize) -> StdRng {
    create_rng(RUN_SEED_BASE.wrapping_add(run_id as u64))
}

/// Hash of `(seed, depth)` mapped into `[0.5, 1.5)`.
pub fn deterministic_noise(seed: u64, depth: u64) -> f64 {
    const MANTISSA: u64 = (1u64 << 53) - 1;

    let mut z = depth.wrapping_add(1) ^ seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z ^= z >> 30;
    z = z.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z ^= z >> 27;
    z = z.wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^= z >> 31;
    0.5 + (z & MANTISSA) as f64 / (MANTISSA + 1) as f64
}

/// Scales `base` by `1 + rel * n` with `n` in `[-0.5, 0.5)`.
///
/// Returns `base` unchanged when `rel <= 0`.
pub fn jitter(base: f64, rel: f64, seed: u64, depth: u64) -> f64 {
    if rel <= 0.0 {
        return base;
    }
    let n = deterministic_noise(seed, depth) - 1.0;
    base * (1.0 + rel * n)
}
