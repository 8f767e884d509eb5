// SPDX-License-Identifier: MIT OR Apache-2.0
//! The graph container and per-frame evaluator.

use crate::backend::RenderBackend;
use crate::data::{Data, DataKind};
use crate::edge::{Edge, EdgeId};
use crate::node::{Node, NodeId};
use crate::pin::{Pin, PinId};
use glint_assets::{AssetId, AssetStore};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Error from a structural graph mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Node id not present in the node table
    #[error("unknown node: {0}")]
    NodeNotFound(NodeId),

    /// Pin id not present in the pin table
    #[error("unknown pin: {0}")]
    PinNotFound(PinId),
}

/// A directed acyclic dataflow graph evaluated once per frame.
///
/// The graph exclusively owns its node, pin, and edge tables; nodes reach
/// shared state only through the graph's methods, never by holding
/// references into the tables. Ids are allocated from monotonically
/// increasing per-table counters and never reused within one graph instance.
pub struct RenderGraph {
    /// Node table. A slot is vacated only while its node's own hook is
    /// executing, so a node never observes itself through the graph.
    pub(crate) nodes: IndexMap<NodeId, Option<Box<dyn Node>>>,
    pub(crate) pins: IndexMap<PinId, Pin>,
    pub(crate) edges: IndexMap<EdgeId, Edge>,
    pub(crate) next_node_id: u64,
    pub(crate) next_pin_id: u64,
    pub(crate) next_edge_id: u64,
    pub(crate) root: Option<NodeId>,
    run_order: Vec<NodeId>,
    should_stop: bool,
    viewport_resolution: [f32; 2],
    time: f32,
    geometry: AssetId,
}

impl std::fmt::Debug for RenderGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderGraph")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("pins", &self.pins.keys().collect::<Vec<_>>())
            .field("edges", &self.edges.keys().collect::<Vec<_>>())
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl RenderGraph {
    /// Create an empty graph bound to the geometry every shader-bearing node
    /// rasterizes with (a full-viewport quad in the built-in nodes).
    pub fn new(geometry: AssetId) -> Self {
        Self {
            nodes: IndexMap::new(),
            pins: IndexMap::new(),
            edges: IndexMap::new(),
            next_node_id: 0,
            next_pin_id: 0,
            next_edge_id: 0,
            root: None,
            run_order: Vec::new(),
            should_stop: false,
            viewport_resolution: [640.0, 480.0],
            time: 0.0,
            geometry,
        }
    }

    /// The shared rasterization geometry.
    pub fn geometry(&self) -> AssetId {
        self.geometry
    }

    /// Current output resolution.
    pub fn viewport_resolution(&self) -> [f32; 2] {
        self.viewport_resolution
    }

    /// Set the output resolution for subsequent passes.
    pub fn set_viewport_resolution(&mut self, resolution: [f32; 2]) {
        self.viewport_resolution = resolution;
    }

    /// Elapsed time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Set elapsed time.
    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    /// Advance elapsed time by one frame delta.
    pub fn advance_time(&mut self, dt: f32) {
        self.time += dt;
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Insert a node: assign it a fresh id and fire `on_enter`.
    pub fn insert_node(&mut self, mut node: Box<dyn Node>) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        node.set_id(id);
        node.on_enter(self);
        self.nodes.insert(id, Some(node));
        id
    }

    /// Insert a node and designate it as the evaluation root (sink).
    pub fn insert_root_node(&mut self, node: Box<dyn Node>) -> NodeId {
        let id = self.insert_node(node);
        self.root = Some(id);
        id
    }

    /// Insert an already-identified node without firing `on_enter`.
    ///
    /// Used when reconstructing a persisted graph: pins are restored
    /// separately and the node receives `on_load` instead.
    pub(crate) fn insert_loaded(&mut self, node: Box<dyn Node>) {
        self.nodes.insert(node.id(), Some(node));
    }

    /// Remove a node: fire `on_exit`, then erase every pin it registered and
    /// every edge touching any of those pins.
    pub fn delete_node(
        &mut self,
        id: NodeId,
        backend: &mut dyn RenderBackend,
    ) -> Result<(), GraphError> {
        let mut node = self
            .nodes
            .shift_remove(&id)
            .flatten()
            .ok_or(GraphError::NodeNotFound(id))?;
        node.on_exit(self, backend);

        let owned: Vec<PinId> = self
            .pins
            .values()
            .filter(|p| p.node == id)
            .map(|p| p.id)
            .collect();
        for pin in owned {
            self.edges.retain(|_, e| !e.involves_pin(pin));
            self.pins.shift_remove(&pin);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        tracing::debug!(node = %id, "deleted node and its pins");
        Ok(())
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&dyn Node> {
        self.nodes.get(&id).and_then(|slot| slot.as_deref())
    }

    /// Look up a node mutably by id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Box<dyn Node>> {
        self.nodes.get_mut(&id).and_then(|slot| slot.as_mut())
    }

    /// Iterate all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &dyn Node> {
        self.nodes.values().filter_map(|slot| slot.as_deref())
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The designated evaluation sink, if any.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Designate the evaluation sink. Toggling the output node is the only
    /// user action expected to call this.
    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Run a closure with a node temporarily detached from the table, so it
    /// can call back into the graph (register or retire pins, claim root).
    ///
    /// This is the host-facing version of the detach the evaluator performs
    /// around every `run`. Returns `None` when the id is unknown or the node
    /// is already detached (a node operating on itself).
    pub fn with_node<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn Node, &mut RenderGraph) -> R,
    ) -> Option<R> {
        let mut node = self.detach(id)?;
        let result = f(node.as_mut(), self);
        self.reattach(id, node);
        Some(result)
    }

    fn detach(&mut self, id: NodeId) -> Option<Box<dyn Node>> {
        self.nodes.get_mut(&id).and_then(Option::take)
    }

    fn reattach(&mut self, id: NodeId, node: Box<dyn Node>) {
        if let Some(slot) = self.nodes.get_mut(&id) {
            *slot = Some(node);
        }
    }

    // ------------------------------------------------------------------
    // Pins
    // ------------------------------------------------------------------

    /// Allocate a pin for `node` with an empty value of the given kind tag.
    ///
    /// Called by nodes from `on_enter` (or at runtime for removable ports),
    /// one call per logical port.
    pub fn register_pin(&mut self, node: NodeId, kind: DataKind) -> PinId {
        let id = PinId(self.next_pin_id);
        self.next_pin_id += 1;
        self.pins.insert(id, Pin::new(id, node, kind));
        id
    }

    /// Remove a pin and every edge referencing it.
    pub fn delete_pin(&mut self, pin: PinId) -> Result<(), GraphError> {
        self.pins
            .shift_remove(&pin)
            .ok_or(GraphError::PinNotFound(pin))?;
        self.edges.retain(|_, e| !e.involves_pin(pin));
        Ok(())
    }

    /// Look up a pin by id.
    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.get(&id)
    }

    /// Iterate all pins.
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins.values()
    }

    /// Read the current value on a pin.
    ///
    /// A miss yields an empty [`Data`] rather than an error, so a node can
    /// read a possibly-retired upstream port without special cases.
    pub fn get_pin_data(&self, pin: PinId) -> Data {
        self.pins
            .get(&pin)
            .map(|p| p.data.clone())
            .unwrap_or_default()
    }

    /// Write a value to a pin and forward it along every outgoing edge.
    ///
    /// Forwarding is what moves data across the graph: a producer writes its
    /// output pin and every connected consumer pin receives a copy. With
    /// multiple edges into one consumer pin, the last producer to run wins.
    pub fn set_pin_data(&mut self, pin: PinId, value: Data) {
        let targets: Vec<PinId> = self
            .edges
            .values()
            .filter(|e| e.from == pin)
            .map(|e| e.to)
            .collect();
        for to in targets {
            if let Some(p) = self.pins.get_mut(&to) {
                p.data = value.clone();
            }
        }
        if let Some(p) = self.pins.get_mut(&pin) {
            p.data = value;
        }
    }

    /// Reset every pin's value to empty.
    ///
    /// Called before a fresh pass so nodes never observe stale values from a
    /// previous frame when inputs are newly disconnected.
    pub fn clear_graph_data(&mut self) {
        for pin in self.pins.values_mut() {
            pin.data.reset();
        }
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Connect a producer pin to a consumer pin.
    pub fn insert_edge(&mut self, from: PinId, to: PinId) -> Result<EdgeId, GraphError> {
        if !self.pins.contains_key(&from) {
            return Err(GraphError::PinNotFound(from));
        }
        if !self.pins.contains_key(&to) {
            return Err(GraphError::PinNotFound(to));
        }
        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        self.edges.insert(id, Edge::new(id, from, to));
        Ok(id)
    }

    /// Remove an edge.
    pub fn delete_edge(&mut self, id: EdgeId) -> Option<Edge> {
        self.edges.shift_remove(&id)
    }

    /// Look up an edge by id.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Iterate all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    // ------------------------------------------------------------------
    // Traversal & evaluation
    // ------------------------------------------------------------------

    /// The direct upstream producers of a node: every other node feeding one
    /// of this node's pins through an edge, in edge insertion order.
    pub fn get_children(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for edge in self.edges.values() {
            let Some(to_pin) = self.pins.get(&edge.to) else {
                continue;
            };
            if to_pin.node != node {
                continue;
            }
            let Some(from_pin) = self.pins.get(&edge.from) else {
                continue;
            };
            if from_pin.node != node && !out.contains(&from_pin.node) {
                out.push(from_pin.node);
            }
        }
        out
    }

    /// Compute the evaluation order for the current frame.
    ///
    /// Depth-first from the root over upstream producers, collected in
    /// post-order: every producer appears before the consumer that reads it
    /// and the root comes last. Nodes unreachable from the root are not
    /// scheduled. Each reachable node appears exactly once even when it is
    /// reachable along several paths; the walk otherwise assumes an acyclic
    /// structure (a cycle terminates but its order is unspecified).
    pub fn topological_order(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        if let Some(root) = self.root {
            if self.nodes.contains_key(&root) {
                self.traverse(root, &mut visited, &mut order);
            }
        }
        order
    }

    fn traverse(&self, id: NodeId, visited: &mut HashSet<NodeId>, order: &mut Vec<NodeId>) {
        if !visited.insert(id) {
            return;
        }
        for child in self.get_children(id) {
            self.traverse(child, visited, order);
        }
        order.push(id);
    }

    /// The order used by the most recent [`RenderGraph::evaluate`] call.
    pub fn run_order(&self) -> &[NodeId] {
        &self.run_order
    }

    /// Cooperatively halt the remainder of the current evaluation pass.
    ///
    /// Checked between node executions, not within them; the flag is reset
    /// at the start of the next pass.
    pub fn stop(&mut self) {
        self.should_stop = true;
    }

    /// Whether the current pass has been halted.
    pub fn stopped(&self) -> bool {
        self.should_stop
    }

    /// Run one evaluation pass.
    ///
    /// A no-op when no root is set. Refreshes the run order, then invokes
    /// each node's `run` in producer-before-consumer order, short-circuiting
    /// the rest of the pass if any node calls [`RenderGraph::stop`].
    pub fn evaluate(&mut self, backend: &mut dyn RenderBackend, assets: &AssetStore) {
        if self.root.is_none() {
            return;
        }
        self.should_stop = false;
        self.run_order = self.topological_order();
        let order = self.run_order.clone();
        for id in order {
            if self.should_stop {
                tracing::debug!(node = %id, "evaluation pass halted before this node");
                break;
            }
            let Some(mut node) = self.detach(id) else {
                continue;
            };
            node.run(self, backend, assets);
            self.reattach(id, node);
        }
    }

    /// Forward the presentation hook to every node in insertion order.
    pub fn render(&mut self, ui: &mut dyn std::any::Any) {
        for slot in self.nodes.values_mut() {
            if let Some(node) = slot.as_mut() {
                node.render(ui);
            }
        }
    }
}
