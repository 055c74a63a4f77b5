//! Error types for graph editing and (de)serialization.

use thiserror::Error;

/// Errors that can occur while editing, encoding or decoding an SDF graph.
#[derive(Error, Debug)]
pub enum SdfError {
    /// Slot index outside `[0, arity)`.
    #[error("Slot index {index} out of range for node with arity {arity}")]
    IndexOutOfRange {
        /// Requested slot index.
        index: usize,
        /// Slot count of the node.
        arity: usize,
    },

    /// A record carried a discriminator no codec is registered for.
    #[error("Unknown type key: {0}")]
    UnknownTypeKey(String),

    /// A record is structurally invalid (missing child, wrong field type).
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// A codec is already registered under this key.
    #[error("Type key already registered: {0}")]
    DuplicateRegistration(String),

    /// The node id does not belong to this graph (or was removed).
    #[error("Node not found in graph")]
    UnknownNode,

    /// The edit would make a node its own ancestor.
    #[error("Attaching node would create a cycle")]
    Cycle,

    /// JSON (de)serialization of a document failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SdfError {
    /// Create a malformed-record error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord(message.into())
    }
}
