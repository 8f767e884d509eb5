// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persisted graph records.
//!
//! The engine defines the record shapes; turning them into bytes on disk is
//! the host's concern (they are plain serde structures, so any self-
//! describing format works).

use crate::backend::RenderBackend;
use crate::data::DataKind;
use crate::edge::{Edge, EdgeId};
use crate::graph::RenderGraph;
use crate::node::{NodeId, NodeRecord};
use crate::pin::{Pin, PinId};
use crate::registry::NodeRegistry;
use glint_assets::AssetId;
use serde::{Deserialize, Serialize};

/// Error producing or consuming persisted records.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// No constructor registered for a node type
    #[error("unknown node type: {0:?}")]
    UnknownNodeType(String),

    /// A node's type-specific state failed to (de)serialize
    #[error("node state: {0}")]
    State(#[from] serde_json::Error),
}

/// Persisted form of a pin (the current value is transient and not saved).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PinRecord {
    /// Pin id
    pub id: PinId,
    /// Owning node
    pub node: NodeId,
    /// Registration kind tag
    pub kind: DataKind,
}

/// Persisted form of an edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Edge id
    pub id: EdgeId,
    /// Producer pin
    pub from: PinId,
    /// Consumer pin
    pub to: PinId,
}

/// Persisted form of a whole graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphRecord {
    /// The shared rasterization geometry the graph was bound to
    pub geometry: AssetId,
    /// The designated evaluation sink
    pub root: Option<NodeId>,
    /// Nodes, in table order
    pub nodes: Vec<NodeRecord>,
    /// Pins, in table order
    pub pins: Vec<PinRecord>,
    /// Edges, in table order
    pub edges: Vec<EdgeRecord>,
    /// Next node id, preserved so restored graphs never reuse ids
    pub next_node_id: u64,
    /// Next pin id
    pub next_pin_id: u64,
    /// Next edge id
    pub next_edge_id: u64,
}

/// Snapshot a graph into its persisted record.
pub fn save_graph(graph: &RenderGraph) -> Result<GraphRecord, PersistError> {
    let nodes = graph
        .nodes()
        .map(|node| node.save())
        .collect::<Result<Vec<_>, _>>()?;
    let pins = graph
        .pins()
        .map(|pin| PinRecord {
            id: pin.id,
            node: pin.node,
            kind: pin.kind,
        })
        .collect();
    let edges = graph
        .edges()
        .map(|edge| EdgeRecord {
            id: edge.id,
            from: edge.from,
            to: edge.to,
        })
        .collect();
    Ok(GraphRecord {
        geometry: graph.geometry(),
        root: graph.root(),
        nodes,
        pins,
        edges,
        next_node_id: graph.next_node_id,
        next_pin_id: graph.next_pin_id,
        next_edge_id: graph.next_edge_id,
    })
}

/// Rebuild a graph from its persisted record.
///
/// Nodes are reconstructed one by one through the registry with their saved
/// ids and pins already in place - `on_enter` does not fire again. Each node
/// then receives `on_load` (in record order) to recreate backend resources.
pub fn load_graph(
    record: &GraphRecord,
    registry: &NodeRegistry,
    backend: &mut dyn RenderBackend,
) -> Result<RenderGraph, PersistError> {
    let mut graph = RenderGraph::new(record.geometry);
    graph.next_node_id = record.next_node_id;
    graph.next_pin_id = record.next_pin_id;
    graph.next_edge_id = record.next_edge_id;

    for pin in &record.pins {
        graph.pins.insert(pin.id, Pin::new(pin.id, pin.node, pin.kind));
    }
    for edge in &record.edges {
        graph.edges.insert(edge.id, Edge::new(edge.id, edge.from, edge.to));
    }

    for node_record in &record.nodes {
        let node = registry.construct(node_record)?;
        graph.insert_loaded(node);
    }
    graph.root = record.root;

    let loaded: Vec<NodeId> = record.nodes.iter().map(|n| n.node_id).collect();
    for id in loaded {
        graph.with_node(id, |node, graph| node.on_load(graph, backend));
    }

    tracing::debug!(
        nodes = record.nodes.len(),
        pins = record.pins.len(),
        edges = record.edges.len(),
        "graph restored"
    );
    Ok(graph)
}
