//! Arena-backed SDF scene graph.
//!
//! Nodes live in a [`SlotMap`] and refer to each other by [`NodeId`]. The
//! forward (owning) direction is parent → slots; every attached node keeps a
//! plain `(parent, slot)` key back to its owner for change propagation.

use crate::error::SdfError;
use crate::node::{Inputs, SdfNode, EMPTY_DISTANCE};
use crate::shapes::Empty;
use sdforge_math::Vec3;
use serde_json::Value;
use slotmap::{new_key_type, SlotMap};
use std::fmt;
use std::sync::Arc;

new_key_type! {
    /// Handle to a node stored in an [`SdfGraph`].
    pub struct NodeId;
}

/// Callback invoked when a node (or something below it) is edited.
///
/// Receives the graph and the node the listener is registered on, which is
/// not necessarily the node that was edited.
pub type Listener = Arc<dyn Fn(&mut SdfGraph, NodeId) + Send + Sync>;

struct NodeEntry {
    node: Box<dyn SdfNode>,
    slots: Vec<NodeId>,
    parent: Option<(NodeId, usize)>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for NodeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeEntry")
            .field("node", &self.node)
            .field("slots", &self.slots)
            .field("parent", &self.parent)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// A mutable tree of SDF nodes.
///
/// Every graph owns a single `Empty` sentinel ([`SdfGraph::empty`]) that
/// fills unset slots. The sentinel is shared by all slots, never gets a
/// parent and is never removed.
#[derive(Debug)]
pub struct SdfGraph {
    nodes: SlotMap<NodeId, NodeEntry>,
    empty: NodeId,
}

impl Default for SdfGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SdfGraph {
    /// Create a graph holding only the `Empty` sentinel.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let empty = nodes.insert(NodeEntry {
            node: Box::new(Empty),
            slots: Vec::new(),
            parent: None,
            listeners: Vec::new(),
        });
        Self { nodes, empty }
    }

    /// The sentinel standing in for unset slots.
    pub fn empty(&self) -> NodeId {
        self.empty
    }

    /// Whether `id` is this graph's sentinel.
    pub fn is_sentinel(&self, id: NodeId) -> bool {
        id == self.empty
    }

    /// Number of nodes, not counting the sentinel.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Whether the graph holds nothing but the sentinel.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` refers to a live node of this graph.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Add a detached node; all of its slots start out as the sentinel.
    pub fn insert<N: SdfNode>(&mut self, node: N) -> NodeId {
        self.insert_boxed(Box::new(node))
    }

    /// Add a detached, already boxed node.
    pub fn insert_boxed(&mut self, node: Box<dyn SdfNode>) -> NodeId {
        let slots = vec![self.empty; node.arity()];
        self.nodes.insert(NodeEntry {
            node,
            slots,
            parent: None,
            listeners: Vec::new(),
        })
    }

    /// Add a node and attach `children` to its first slots.
    ///
    /// Attaching happens silently (no change event on the new node), the
    /// way a constructor fills its inputs. Children that were attached
    /// elsewhere are moved.
    pub fn build<N: SdfNode>(&mut self, node: N, children: &[NodeId]) -> Result<NodeId, SdfError> {
        self.build_boxed(Box::new(node), children)
    }

    /// Boxed variant of [`SdfGraph::build`].
    pub fn build_boxed(
        &mut self,
        node: Box<dyn SdfNode>,
        children: &[NodeId],
    ) -> Result<NodeId, SdfError> {
        let arity = node.arity();
        if children.len() > arity {
            return Err(SdfError::IndexOutOfRange {
                index: arity,
                arity,
            });
        }
        if children.iter().any(|&child| !self.contains(child)) {
            return Err(SdfError::UnknownNode);
        }

        let id = self.insert_boxed(node);
        for (index, &child) in children.iter().enumerate() {
            let displaced = self.set_slot_silent(id, index, Some(child))?;
            self.notify_displaced(displaced, id);
        }
        Ok(id)
    }

    /// Detach `id` from its parent (if any) and free it with all of its
    /// descendants. Returns the number of nodes removed.
    ///
    /// The old parent is notified once the subtree is gone, so its
    /// listeners never see the removed nodes. Removing the sentinel is a
    /// no-op.
    pub fn remove_tree(&mut self, id: NodeId) -> Result<usize, SdfError> {
        if id == self.empty {
            return Ok(0);
        }
        let parent = self.entry(id)?.parent;
        if let Some((parent, index)) = parent {
            self.set_slot_silent(parent, index, None)?;
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if next == self.empty {
                continue;
            }
            if let Some(entry) = self.nodes.remove(next) {
                stack.extend(entry.slots);
                removed += 1;
            }
        }
        tracing::trace!(?id, removed, "subtree removed");
        if let Some((parent, _)) = parent {
            self.emit_change_event(parent);
        }
        Ok(removed)
    }

    // =========================================================================
    // Structure queries
    // =========================================================================

    fn entry(&self, id: NodeId) -> Result<&NodeEntry, SdfError> {
        self.nodes.get(id).ok_or(SdfError::UnknownNode)
    }

    /// The node value stored under `id`.
    pub fn node(&self, id: NodeId) -> Option<&dyn SdfNode> {
        self.nodes.get(id).map(|entry| entry.node.as_ref())
    }

    /// Registry key of the node.
    pub fn type_key(&self, id: NodeId) -> Result<&'static str, SdfError> {
        Ok(self.entry(id)?.node.type_key())
    }

    /// Fixed slot count of the node.
    pub fn arity(&self, id: NodeId) -> Result<usize, SdfError> {
        Ok(self.entry(id)?.slots.len())
    }

    /// All slots of the node, in order.
    pub fn slots(&self, id: NodeId) -> Result<&[NodeId], SdfError> {
        Ok(&self.entry(id)?.slots)
    }

    /// The node currently in slot `index`.
    pub fn get_slot(&self, id: NodeId, index: usize) -> Result<NodeId, SdfError> {
        let slots = &self.entry(id)?.slots;
        slots.get(index).copied().ok_or(SdfError::IndexOutOfRange {
            index,
            arity: slots.len(),
        })
    }

    /// The node owning `id`, or `None` for a root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent.map(|(parent, _)| parent)
    }

    /// Index of the parent slot holding `id`, or `None` for a root.
    pub fn parent_slot_index(&self, id: NodeId) -> Option<usize> {
        self.nodes.get(id)?.parent.map(|(_, index)| index)
    }

    /// Topmost ancestor of `id` (itself when detached).
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// True iff any slot holds something other than an `Empty` node.
    ///
    /// Editors use this to detect combinators that still need inputs.
    pub fn has_non_empty_children(&self, id: NodeId) -> Result<bool, SdfError> {
        Ok(self.entry(id)?.slots.iter().any(|&child| {
            child != self.empty
                && self
                    .nodes
                    .get(child)
                    .is_some_and(|entry| entry.node.type_key() != Empty::KEY)
        }))
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == candidate {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Replace the occupant of slot `index` and notify listeners.
    ///
    /// `None` installs the sentinel. The previous occupant is detached; a
    /// `child` attached elsewhere is moved out of its old slot (which
    /// becomes the sentinel). Fails without touching the graph if the index
    /// is out of range, an id is stale, or `child` is `id` or one of its
    /// ancestors.
    pub fn set_slot(
        &mut self,
        id: NodeId,
        index: usize,
        child: Option<NodeId>,
    ) -> Result<(), SdfError> {
        let displaced = self.set_slot_silent(id, index, child)?;
        self.notify_displaced(displaced, id);
        self.emit_change_event(id);
        Ok(())
    }

    /// Slot replacement without the change event on `id`.
    ///
    /// Returns the old parent `child` was moved away from, if any.
    pub(crate) fn set_slot_silent(
        &mut self,
        id: NodeId,
        index: usize,
        child: Option<NodeId>,
    ) -> Result<Option<NodeId>, SdfError> {
        let child = child.unwrap_or(self.empty);
        let entry = self.entry(id)?;
        let arity = entry.slots.len();
        if index >= arity {
            return Err(SdfError::IndexOutOfRange { index, arity });
        }
        let previous = entry.slots[index];
        if !self.contains(child) {
            return Err(SdfError::UnknownNode);
        }
        if child != self.empty && self.is_ancestor_or_self(child, id) {
            return Err(SdfError::Cycle);
        }
        if previous == child {
            return Ok(None);
        }

        let mut displaced = None;
        if child != self.empty {
            if let Some((old_parent, old_index)) = self.nodes[child].parent.take() {
                self.nodes[old_parent].slots[old_index] = self.empty;
                displaced = Some(old_parent);
            }
        }
        if previous != self.empty {
            self.nodes[previous].parent = None;
        }
        self.nodes[id].slots[index] = child;
        if child != self.empty {
            self.nodes[child].parent = Some((id, index));
        }
        tracing::trace!(?id, index, ?child, "slot replaced");
        Ok(displaced)
    }

    /// The slot a node was moved out of is an edit as well. Its branch is
    /// notified up to (not including) the nearest ancestor it shares with
    /// `target`; the event at `target` covers the rest.
    fn notify_displaced(&mut self, displaced: Option<NodeId>, target: NodeId) {
        let Some(old_parent) = displaced else {
            return;
        };
        let shared = self.ancestors_or_self(target);
        self.emit_up_to(old_parent, &shared);
    }

    fn ancestors_or_self(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    // =========================================================================
    // Change propagation
    // =========================================================================

    /// Register `listener` on exactly this node. Adding the same `Arc`
    /// twice has no further effect.
    pub fn add_change_listener(&mut self, id: NodeId, listener: Listener) -> Result<(), SdfError> {
        let entry = self.nodes.get_mut(id).ok_or(SdfError::UnknownNode)?;
        if !entry.listeners.iter().any(|l| same_listener(l, &listener)) {
            entry.listeners.push(listener);
        }
        Ok(())
    }

    /// Unregister `listener` from this node. Returns whether it was present.
    pub fn remove_change_listener(&mut self, id: NodeId, listener: &Listener) -> bool {
        let Some(entry) = self.nodes.get_mut(id) else {
            return false;
        };
        let before = entry.listeners.len();
        entry.listeners.retain(|l| !same_listener(l, listener));
        entry.listeners.len() != before
    }

    /// Number of listeners registered directly on the node.
    pub fn listener_count(&self, id: NodeId) -> usize {
        self.nodes.get(id).map_or(0, |entry| entry.listeners.len())
    }

    /// Notify listeners of `id`, then of each ancestor up to the root.
    ///
    /// Each listener receives the node it is registered on. Listeners may
    /// edit the graph; the parent chain is re-read after they return.
    pub fn emit_change_event(&mut self, id: NodeId) {
        self.emit_up_to(id, &[]);
    }

    /// Like [`SdfGraph::emit_change_event`], stopping before any node in
    /// `stop`.
    fn emit_up_to(&mut self, id: NodeId, stop: &[NodeId]) {
        let mut current = Some(id);
        while let Some(node) = current {
            if stop.contains(&node) {
                break;
            }
            let Some(entry) = self.nodes.get(node) else {
                break;
            };
            let listeners = entry.listeners.clone();
            for listener in &listeners {
                listener(self, node);
            }
            current = self.parent(node);
        }
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Signed distance from `p` to the surface described by the subtree at
    /// `id`. A stale id evaluates like the sentinel.
    pub fn distance(&self, id: NodeId, p: &Vec3) -> f64 {
        match self.nodes.get(id) {
            Some(entry) => entry.node.distance(p, &Inputs::new(self, &entry.slots)),
            None => EMPTY_DISTANCE,
        }
    }

    /// Human-readable, indented dump of the subtree at `id`.
    pub fn display(&self, id: NodeId) -> TreeDisplay<'_> {
        TreeDisplay { graph: self, root: id }
    }

    fn fmt_tree(
        &self,
        f: &mut fmt::Formatter<'_>,
        id: NodeId,
        depth: usize,
        field: Option<&str>,
    ) -> fmt::Result {
        write!(f, "{:width$}", "", width = depth * 2)?;
        if let Some(field) = field {
            write!(f, "{field}: ")?;
        }
        let Some(entry) = self.nodes.get(id) else {
            return writeln!(f, "<missing>");
        };
        write!(f, "{}", entry.node.type_key())?;
        if let Ok(params) = entry.node.params() {
            if !params.is_empty() {
                write!(f, " {}", Value::Object(params))?;
            }
        }
        writeln!(f)?;

        let names = entry.node.slot_names();
        for (index, &child) in entry.slots.iter().enumerate() {
            self.fmt_tree(f, child, depth + 1, names.get(index).copied())?;
        }
        Ok(())
    }
}

fn same_listener(a: &Listener, b: &Listener) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// [`fmt::Display`] adapter returned by [`SdfGraph::display`].
#[derive(Debug, Clone, Copy)]
pub struct TreeDisplay<'g> {
    graph: &'g SdfGraph,
    root: NodeId,
}

impl fmt::Display for TreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.graph.fmt_tree(f, self.root, 0, None)
    }
}
