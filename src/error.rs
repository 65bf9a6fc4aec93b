//! Error Types
//!
//! Fatal conditions of the carbon engine. Data-quality problems (mismatching
//! declared footprints, missing declarations) are not errors; they are
//! reported to the analysis warning sink instead.

use thiserror::Error;

/// Errors raised by tree construction, editing, flattening and token decoding.
#[derive(Debug, Error)]
pub enum TraceError {
    /// A single life cycle phase code could not be parsed.
    #[error("Invalid life cycle phase: {0}")]
    InvalidLifeCyclePhase(String),

    /// The plain input record is missing required parts or is not valid JSON.
    #[error("Malformed carbon tree record: {0}")]
    MalformedRecord(String),

    /// `add_connection` target is already connected.
    #[error("Connection {0} already exists")]
    ConnectionExists(String),

    /// Swap or reset of an id neither current nor original.
    #[error("Connection {0} does not exist in the current tree")]
    UnknownConnection(String),

    /// A path passed to `edit`/`node` does not lead to a node.
    #[error("No node at path {0:?}")]
    NodeNotFound(Vec<String>),

    /// An asset id was visited twice while flattening the tree.
    #[error("Circular dependency error for node {0}")]
    CircularDependency(String),

    /// A persisted simulation token cannot be decompressed or decoded.
    #[error("Corrupt simulation token: {0}")]
    CorruptToken(String),

    /// A transport footprint declares an unknown emission scope.
    #[error("TCFProcessesForGreenhouseGasEmissionInATransportService '{0}' is unknown")]
    UnknownTransportProcess(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TraceError>;
