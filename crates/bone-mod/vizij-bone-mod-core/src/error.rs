//! Error types for bone modification and graph assembly.

use thiserror::Error;

/// Failures reported by a [`GraphEngine`](crate::graph::GraphEngine) while building
/// or wiring nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("graph has been destroyed")]
    Destroyed,
    #[error("unknown node {0}")]
    UnknownNode(usize),
    #[error("node {node} has no input port {port} (input count {count})")]
    PortOutOfRange { node: usize, port: usize, count: usize },
    #[error("connecting {from} -> {to} would create a cycle")]
    Cycle { from: usize, to: usize },
    #[error("node {0} cannot take inputs")]
    NotAMixer(usize),
}

/// Errors surfaced by the bone modification core.
#[derive(Debug, Error)]
pub enum BoneModError {
    /// The configured bone reference could not be resolved at start/rebind.
    #[error("bone '{0}' could not be bound")]
    Bind(String),
    /// The graph was built before the job or its transform handle was bound.
    #[error("graph construction failed: {0}")]
    GraphConstruction(String),
    /// A raw mode value outside the known set. Indicates a caller defect.
    #[error("invalid modify mode {0}")]
    InvalidMode(u8),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BoneModError>;
