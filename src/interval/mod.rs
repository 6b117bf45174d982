//! Interval arithmetic primitives.
//!
//! The search core only needs a handful of box queries (diameter, volume,
//! midpoint, validity, widest-dimension bisection). These types provide
//! exactly that; contraction and objective enclosures are supplied by the
//! caller through [`BoxProblem`](crate::problem::BoxProblem).

mod boxes;
mod scalar;

pub use boxes::IntervalBox;
pub use scalar::Interval;
