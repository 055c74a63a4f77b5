//! The node capability set shared by every primitive and combinator.

use crate::error::SdfError;
use crate::graph::{NodeId, SdfGraph};
use sdforge_math::Vec3;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Distance reported by the `Empty` sentinel: "outside everything".
///
/// Under `min` it never wins against a real surface, so an unset slot is
/// an identity for union.
pub const EMPTY_DISTANCE: f64 = f64::MAX;

/// A node's own parameters in wire form (a JSON object without the
/// discriminator and slot fields).
pub type Params = serde_json::Map<String, Value>;

/// Slot field name of a unary node.
pub const UNARY_SLOTS: [&str; 1] = ["sdf"];

/// Slot field names of a binary node.
pub const BINARY_SLOTS: [&str; 2] = ["sdf_a", "sdf_b"];

/// A concrete kind of SDF graph node.
///
/// Children are not stored in the node itself; the owning [`SdfGraph`]
/// keeps `arity()` slots for it and hands their distances back through
/// [`Inputs`] during evaluation.
pub trait SdfNode: fmt::Debug + Send + Sync + 'static {
    /// Stable registry key used to dispatch (de)serialization.
    fn type_key(&self) -> &'static str;

    /// Number of child slots. Fixed for the node's lifetime.
    fn arity(&self) -> usize {
        0
    }

    /// Wire field names of the child slots, one per slot.
    fn slot_names(&self) -> &'static [&'static str] {
        match self.arity() {
            0 => &[],
            1 => &UNARY_SLOTS,
            _ => &BINARY_SLOTS,
        }
    }

    /// Signed distance from `p` to this node's surface.
    fn distance(&self, p: &Vec3, inputs: &Inputs<'_>) -> f64;

    /// The node's own parameters, excluding children.
    fn params(&self) -> Result<Params, SdfError> {
        Ok(Params::new())
    }
}

/// Lazy access to a node's children during evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Inputs<'g> {
    graph: &'g SdfGraph,
    slots: &'g [NodeId],
}

impl<'g> Inputs<'g> {
    pub(crate) fn new(graph: &'g SdfGraph, slots: &'g [NodeId]) -> Self {
        Self { graph, slots }
    }

    /// Number of child slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the node has no child slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Distance of child `index` at `p`.
    ///
    /// An index past the last slot reads as an unset slot.
    pub fn distance(&self, index: usize, p: &Vec3) -> f64 {
        self.slots
            .get(index)
            .map_or(EMPTY_DISTANCE, |&child| self.graph.distance(child, p))
    }
}

/// Serialize a parameter struct into [`Params`].
pub fn to_params<T: Serialize>(value: &T) -> Result<Params, SdfError> {
    match serde_json::to_value(value).map_err(|e| SdfError::malformed(e.to_string()))? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Params::new()),
        other => Err(SdfError::malformed(format!(
            "parameters must serialize to an object, got {other}"
        ))),
    }
}
