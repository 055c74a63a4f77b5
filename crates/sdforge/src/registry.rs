//! Type registry and key-dispatched codec.
//!
//! Every node kind is registered under a unique string key together with a
//! decoder for its parameters. A node is encoded as one JSON object:
//!
//! ```json
//! { "type": "union",
//!   "sdf_a": { "type": "sphere", "center": [0.0, 0.0, 0.0], "radius": 1.0 },
//!   "sdf_b": { "type": "empty" } }
//! ```
//!
//! Parameters sit next to the discriminator; children are embedded under
//! the node's slot field names (`sdf` for unary, `sdf_a`/`sdf_b` for binary
//! nodes). Registering a key twice is rejected.

use crate::error::SdfError;
use crate::graph::{NodeId, SdfGraph};
use crate::node::{Params, SdfNode};
use crate::ops::{Difference, Intersection, Invert, Union};
use crate::shapes::{Box3, Cylinder, Ellipsoid, Empty, Prism, Sphere};
use crate::smooth::{SmoothDifference, SmoothIntersection, SmoothUnion};
use crate::transforms::{Rotate, Scale, Translate};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Once, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Name of the discriminator field in an encoded record.
pub const TYPE_FIELD: &str = "type";

/// Builds a node from its parameters (children are attached separately).
pub type DecodeFn = fn(&Params) -> Result<Box<dyn SdfNode>, SdfError>;

/// Decoder half of a registered node kind.
///
/// Encoding goes through [`SdfNode::params`], so only decoding needs to be
/// registered.
#[derive(Debug, Clone, Copy)]
pub struct NodeCodec {
    decode: DecodeFn,
}

impl NodeCodec {
    /// Codec with a custom decoder (e.g. one that validates parameters).
    pub fn new(decode: DecodeFn) -> Self {
        Self { decode }
    }

    /// Codec deserializing the parameters with serde.
    pub fn of<T: SdfNode + DeserializeOwned>() -> Self {
        Self::new(decode_serde::<T>)
    }

    /// Codec for parameterless kinds.
    pub fn unit<T: SdfNode + Default>() -> Self {
        Self::new(decode_default::<T>)
    }

    /// Build a node from `params`.
    pub fn decode(&self, params: &Params) -> Result<Box<dyn SdfNode>, SdfError> {
        (self.decode)(params)
    }
}

fn decode_serde<T: SdfNode + DeserializeOwned>(
    params: &Params,
) -> Result<Box<dyn SdfNode>, SdfError> {
    let node: T = serde_json::from_value(Value::Object(params.clone()))
        .map_err(|e| SdfError::malformed(e.to_string()))?;
    Ok(Box::new(node))
}

fn decode_default<T: SdfNode + Default>(_params: &Params) -> Result<Box<dyn SdfNode>, SdfError> {
    Ok(Box::new(T::default()))
}

/// The built-in node kinds, keyed as they appear on the wire.
pub fn builtin_codecs() -> [(&'static str, NodeCodec); 16] {
    [
        (Union::KEY, NodeCodec::unit::<Union>()),
        (Intersection::KEY, NodeCodec::unit::<Intersection>()),
        (Difference::KEY, NodeCodec::unit::<Difference>()),
        (Invert::KEY, NodeCodec::unit::<Invert>()),
        (Empty::KEY, NodeCodec::unit::<Empty>()),
        (Sphere::KEY, NodeCodec::of::<Sphere>()),
        (Box3::KEY, NodeCodec::of::<Box3>()),
        (Cylinder::KEY, NodeCodec::of::<Cylinder>()),
        (Prism::KEY, NodeCodec::of::<Prism>()),
        (Ellipsoid::KEY, NodeCodec::of::<Ellipsoid>()),
        (Translate::KEY, NodeCodec::of::<Translate>()),
        (Scale::KEY, NodeCodec::of::<Scale>()),
        (Rotate::KEY, NodeCodec::of::<Rotate>()),
        (SmoothUnion::KEY, NodeCodec::of::<SmoothUnion>()),
        (SmoothIntersection::KEY, NodeCodec::of::<SmoothIntersection>()),
        (SmoothDifference::KEY, NodeCodec::of::<SmoothDifference>()),
    ]
}

/// A decoded record, not yet inserted into a graph.
struct DecodedTree {
    node: Box<dyn SdfNode>,
    children: Vec<DecodedTree>,
}

/// Map from type key to codec.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    codecs: BTreeMap<String, NodeCodec>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in kind.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Register `codec` under `key`.
    pub fn register(&mut self, key: impl Into<String>, codec: NodeCodec) -> Result<(), SdfError> {
        let key = key.into();
        if self.codecs.contains_key(&key) {
            return Err(SdfError::DuplicateRegistration(key));
        }
        tracing::debug!(key = %key, "registered SDF node kind");
        self.codecs.insert(key, codec);
        Ok(())
    }

    /// Register every built-in kind whose key is still free. Keys already
    /// claimed are left alone. Returns how many kinds were added.
    pub fn register_builtins(&mut self) -> usize {
        let mut added = 0;
        for (key, codec) in builtin_codecs() {
            match self.register(key, codec) {
                Ok(()) => added += 1,
                Err(_) => tracing::warn!(key, "built-in key already registered, keeping existing codec"),
            }
        }
        added
    }

    /// Whether a codec is registered under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.codecs.contains_key(key)
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    // =========================================================================
    // Full records
    // =========================================================================

    /// Encode the subtree at `id` as a nested record.
    ///
    /// Fails with [`SdfError::UnknownTypeKey`] if any node's kind is not
    /// registered here, since the record could not be decoded again.
    pub fn encode(&self, graph: &SdfGraph, id: NodeId) -> Result<Value, SdfError> {
        let node = graph.node(id).ok_or(SdfError::UnknownNode)?;
        let key = node.type_key();
        if !self.contains(key) {
            return Err(SdfError::UnknownTypeKey(key.to_string()));
        }

        let mut record = node.params()?;
        record.insert(TYPE_FIELD.to_string(), Value::String(key.to_string()));

        let slots = graph.slots(id)?;
        let names = node.slot_names();
        if names.len() != slots.len() {
            return Err(SdfError::malformed(format!(
                "`{key}` names {} slot fields for arity {}",
                names.len(),
                slots.len()
            )));
        }
        for (name, &child) in names.iter().zip(slots) {
            record.insert((*name).to_string(), self.encode(graph, child)?);
        }
        Ok(Value::Object(record))
    }

    /// Decode a record into `graph` and return the new subtree's root.
    ///
    /// All-or-nothing: the whole record is decoded before any node is
    /// inserted, so a failure leaves `graph` untouched. `empty` records
    /// decode to the graph's sentinel.
    pub fn decode(&self, graph: &mut SdfGraph, record: &Value) -> Result<NodeId, SdfError> {
        let tree = self.decode_tree(record).inspect_err(|e| {
            tracing::debug!(error = %e, "SDF record rejected");
        })?;
        insert_tree(graph, tree)
    }

    fn decode_tree(&self, record: &Value) -> Result<DecodedTree, SdfError> {
        let Value::Object(fields) = record else {
            return Err(SdfError::malformed(format!("expected an object, got {record}")));
        };
        let key = fields
            .get(TYPE_FIELD)
            .ok_or_else(|| SdfError::malformed("missing `type` field"))?
            .as_str()
            .ok_or_else(|| SdfError::malformed("`type` must be a string"))?;
        let codec = self
            .codecs
            .get(key)
            .ok_or_else(|| SdfError::UnknownTypeKey(key.to_string()))?;

        // Slot names are only known once the node exists, so slot fields
        // reach the decoder too; serde skips fields a kind does not declare.
        let mut params = fields.clone();
        params.remove(TYPE_FIELD);
        let node = codec.decode(&params)?;
        if node.type_key() != key {
            return Err(SdfError::malformed(format!(
                "codec for `{key}` produced a `{}` node",
                node.type_key()
            )));
        }

        let names = node.slot_names();
        if names.len() != node.arity() {
            return Err(SdfError::malformed(format!(
                "`{key}` names {} slot fields for arity {}",
                names.len(),
                node.arity()
            )));
        }
        let children = names
            .iter()
            .map(|name| {
                let child = fields.get(*name).ok_or_else(|| {
                    SdfError::malformed(format!("`{key}` record is missing child `{name}`"))
                })?;
                self.decode_tree(child)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DecodedTree { node, children })
    }

    // =========================================================================
    // Key-only records
    // =========================================================================

    /// Encode only the discriminator of the node at `id`.
    ///
    /// Enough to identify the kind over a narrow channel; it cannot be
    /// decoded back into a node.
    pub fn encode_key(&self, graph: &SdfGraph, id: NodeId) -> Result<Value, SdfError> {
        let key = graph.type_key(id)?;
        if !self.contains(key) {
            return Err(SdfError::UnknownTypeKey(key.to_string()));
        }
        Ok(Value::String(key.to_string()))
    }

    /// Read a key-only record, checking that the key is registered.
    pub fn decode_key<'r>(&self, record: &'r Value) -> Result<&'r str, SdfError> {
        let key = record
            .as_str()
            .ok_or_else(|| SdfError::malformed(format!("expected a type key, got {record}")))?;
        if self.contains(key) {
            Ok(key)
        } else {
            Err(SdfError::UnknownTypeKey(key.to_string()))
        }
    }
}

fn insert_tree(graph: &mut SdfGraph, tree: DecodedTree) -> Result<NodeId, SdfError> {
    if tree.node.type_key() == Empty::KEY && tree.node.arity() == 0 {
        return Ok(graph.empty());
    }
    let id = graph.insert_boxed(tree.node);
    for (index, child) in tree.children.into_iter().enumerate() {
        let child = insert_tree(graph, child)?;
        graph.set_slot_silent(id, index, Some(child))?;
    }
    Ok(id)
}

// =============================================================================
// Process-wide registry
// =============================================================================

static GLOBAL: OnceLock<RwLock<Registry>> = OnceLock::new();
static BUILTINS: Once = Once::new();

/// The process-wide registry. Starts empty until [`register_all`] runs.
pub fn global() -> &'static RwLock<Registry> {
    GLOBAL.get_or_init(|| RwLock::new(Registry::new()))
}

fn read() -> RwLockReadGuard<'static, Registry> {
    global().read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, Registry> {
    global().write().unwrap_or_else(PoisonError::into_inner)
}

/// Register the built-in kinds with the process-wide registry.
///
/// Runs once; later calls do nothing. Kinds registered earlier by external
/// code under a built-in key keep their codec.
pub fn register_all() {
    BUILTINS.call_once(|| {
        let added = write().register_builtins();
        tracing::debug!(added, "built-in SDF node kinds registered");
    });
}

/// Register an additional kind with the process-wide registry.
pub fn register(key: impl Into<String>, codec: NodeCodec) -> Result<(), SdfError> {
    write().register(key, codec)
}

/// [`Registry::encode`] against the process-wide registry.
pub fn encode(graph: &SdfGraph, id: NodeId) -> Result<Value, SdfError> {
    read().encode(graph, id)
}

/// [`Registry::decode`] against the process-wide registry.
pub fn decode(graph: &mut SdfGraph, record: &Value) -> Result<NodeId, SdfError> {
    read().decode(graph, record)
}
