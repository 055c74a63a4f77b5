//! Versioned scene file (`.sdf.json`).

use crate::error::SdfError;
use crate::graph::{NodeId, SdfGraph};
use crate::registry::{Registry, TYPE_FIELD};
use crate::shapes::Empty;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Format version written by this crate.
pub const DOCUMENT_VERSION: &str = "0.1";

/// A scene on disk: a version tag and one encoded node tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Format version string (e.g. "0.1").
    pub version: String,
    /// Root record, as produced by [`Registry::encode`].
    pub root: Value,
}

impl Default for SceneDocument {
    fn default() -> Self {
        let mut root = serde_json::Map::new();
        root.insert(TYPE_FIELD.to_string(), Value::String(Empty::KEY.to_string()));
        Self {
            version: DOCUMENT_VERSION.to_string(),
            root: Value::Object(root),
        }
    }
}

impl SceneDocument {
    /// Create a document holding an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode the subtree at `root`.
    pub fn from_graph(registry: &Registry, graph: &SdfGraph, root: NodeId) -> Result<Self, SdfError> {
        Ok(Self {
            version: DOCUMENT_VERSION.to_string(),
            root: registry.encode(graph, root)?,
        })
    }

    /// Decode the scene into `graph` and return its root.
    pub fn load(&self, registry: &Registry, graph: &mut SdfGraph) -> Result<NodeId, SdfError> {
        if self.version != DOCUMENT_VERSION {
            tracing::warn!(
                version = %self.version,
                expected = DOCUMENT_VERSION,
                "loading scene with a different format version"
            );
        }
        registry.decode(graph, &self.root)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, SdfError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SdfError> {
        Ok(serde_json::from_str(json)?)
    }
}
