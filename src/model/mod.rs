//! Carbon Model
//!
//! Input records, declared footprints and the editable carbon tree with its
//! simulation snapshots.

pub mod diff;
pub mod events;
pub mod footprint;
pub mod record;
pub mod simulation;
pub mod status;
pub mod tree;

pub use diff::{epsilon_zero, format_diff};
pub use events::{ChangeNotifier, TreeEvent};
pub use footprint::{
    CarbonFootprint, FootprintData, GoodsAddress, ProductCarbonFootprint, TransportCarbonFootprint,
    TransportProcesses,
};
pub use record::{AssetInfo, BasicInfo, CarbonTreeRecord, ConnectionInfo};
pub use simulation::SimulationChanges;
pub use status::{ConnectionStatus, EditKind, ResetOutcome};
pub use tree::{CarbonTree, CarbonTreeBuilder};
