//! Carbon Trace
//!
//! Carbon footprint tracing for composite products:
//! - Life cycle phase parsing and set algebra
//! - Bulk-weighted CO2eq aggregation over asset hierarchies
//! - Non-destructive what-if edits with diffs against the baseline
//! - Compact URL-safe tokens for persisted simulations

pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod flow;
pub mod lifecycle;
pub mod model;
pub mod telemetry;

// Re-exports for convenience
pub use config::{ConfigManager, TraceConfig};
pub use diagnostics::{AnalysisWarning, BufferedWarnings, WarningSink, ANALYSIS_WARNINGS};
pub use error::{Result, TraceError};
pub use flow::{collect_links, FootprintLink, LinkKind};
pub use lifecycle::{LifeCyclePhase, LifeCyclePhases, LifeCycleStage};
pub use model::{
    CarbonFootprint, CarbonTree, CarbonTreeBuilder, CarbonTreeRecord, ConnectionStatus, EditKind,
    SimulationChanges, TreeEvent,
};
