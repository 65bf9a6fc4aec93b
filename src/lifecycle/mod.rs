//! Life Cycle Module
//!
//! Phase codes of a product's life cycle and the set algebra used to
//! classify and color footprint contributions.

pub mod phase;
pub mod phases;

pub use phase::{phases_by_stage, LifeCyclePhase, LifeCycleStage, Rgb, UNSPECIFIED_COLOR, UNSPECIFIED_TEXT};
pub use phases::{LifeCyclePhases, PhaseDiff};
