//! Stack-based branch and bound with diving.
//!
//! The driver keeps a LIFO worklist of [`Node`](crate::node::Node)s. Every
//! node that survives contraction and the bound test is used as the root
//! of a dive, which acts as a primal heuristic feeding the shared
//! incumbent, and is then bisected. Shallow nodes that contract to empty
//! are split anyway, which recovers from contractors that spuriously
//! report infeasibility on large boxes.

mod config;
mod runner;

pub use config::BnbConfig;
pub use runner::{BnbOutcome, BnbRunner};
