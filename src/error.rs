//! Error types for the matching core.
//!
//! Constraint violations are not errors: they are reported through
//! [`ValidationResponse`](crate::constraints::ValidationResponse). The types
//! here cover the failures that abort an operation.

use thiserror::Error;

use crate::graph::{CollectionId, EdgeKey, NodeKey};
use crate::store::StoreError;

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, MatchError>;

/// Top-level error for order loading and match searches.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The backing store failed or returned malformed documents.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An operation on the flow graph was rejected.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Configuration could not be loaded or is out of range.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A persisted order violates a structural invariant.
    #[error("Invalid order {order_id}: {reason}")]
    InvalidOrder { order_id: String, reason: String },
}

/// Errors raised by [`FlowGraph`](crate::graph::FlowGraph) and
/// [`NodeCollection`](crate::graph::NodeCollection).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Unknown node {0:?}")]
    UnknownNode(NodeKey),

    #[error("Unknown edge {0:?}")]
    UnknownEdge(EdgeKey),

    /// Edges always join one source node to one sink node.
    #[error("Cannot link {0:?} and {1:?}: both nodes have the same role")]
    SameRole(NodeKey, NodeKey),

    #[error("Nodes {0:?} and {1:?} are already linked")]
    AlreadyLinked(NodeKey, NodeKey),

    #[error("Node {node:?} already belongs to collection {collection:?}")]
    AlreadyMember { node: NodeKey, collection: CollectionId },

    #[error("Node {node:?} is not a member of collection {collection:?}")]
    NotMember { node: NodeKey, collection: CollectionId },

    /// The edge already carries a unit or an endpoint is saturated.
    #[error("Edge {0:?} has no remaining capacity")]
    Saturated(EdgeKey),
}

/// Errors raised while loading [`MatchingConfig`](crate::config::MatchingConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

// ============================================================================
// Unit Tests
// ============================================================================
