// src/engine/mod.rs
pub mod compare;
#[allow(clippy::module_inception)]
pub mod engine;
pub mod stitch;
pub mod types;

pub use compare::{Comparison, align_and_compare, classify, find_pivot};
pub use engine::{ComparisonUnit, run_comparison};
pub use stitch::{detect_overlap, stitch};
pub use types::*;
