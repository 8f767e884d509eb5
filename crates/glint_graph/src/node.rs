// SPDX-License-Identifier: MIT OR Apache-2.0
//! The polymorphic contract every node type implements.

use crate::backend::RenderBackend;
use crate::graph::RenderGraph;
use crate::persist::PersistError;
use crate::pin::PinId;
use glint_assets::AssetStore;
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Unique identifier for a node within one graph.
///
/// Identity is stable for the lifetime of the node inside one graph
/// instance; a cloned node receives a fresh id only when inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Persisted form of a single node.
///
/// `state` is the node type's own serde record; the [`crate::NodeRegistry`]
/// constructor registered under `node_type` must reconstruct exactly the
/// fields the node wrote, including dynamic pin sets in their original order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Factory key (registry discriminator)
    pub node_type: String,
    /// Graph-assigned node id
    pub node_id: NodeId,
    /// Canvas position, kept for the external editor
    pub position: [f32; 2],
    /// Type-specific fields
    pub state: serde_json::Value,
}

/// A computation unit in the graph.
///
/// Lifecycle, as driven by the graph: `on_enter` fires exactly once on
/// insertion and registers the node's pins; `run` fires once per frame in
/// dependency order; `on_exit` fires exactly once on removal and releases
/// backend resources. A node reconstructed from a [`NodeRecord`] skips
/// `on_enter` (its pins are already restored) and receives `on_load` instead
/// to recreate backend resources that were not serializable.
pub trait Node {
    /// Stable factory key for this node type.
    fn type_name(&self) -> &'static str;

    /// Graph-assigned id.
    fn id(&self) -> NodeId;

    /// Set the graph-assigned id (called by the graph on insertion).
    fn set_id(&mut self, id: NodeId);

    /// Canvas position for the external editor.
    fn position(&self) -> [f32; 2];

    /// Move the node on the canvas.
    fn set_position(&mut self, position: [f32; 2]);

    /// Deep-copy node-local state.
    ///
    /// Graph-assigned identity and pin ids are not meaningful on the copy;
    /// a subsequent `on_enter` reinitializes them.
    fn clone_node(&self) -> Box<dyn Node>;

    /// The ordered list of this node's current pin ids.
    ///
    /// Used to remap edges across a copy boundary by positional index,
    /// since pin ids differ between an original and its copy.
    fn layout(&self) -> Vec<PinId>;

    /// Called exactly once when the node is inserted into a live graph.
    ///
    /// Registers all of the node's pins via
    /// [`RenderGraph::register_pin`] and establishes graph-side defaults
    /// (an output-capable node claims the root here).
    fn on_enter(&mut self, graph: &mut RenderGraph);

    /// Called exactly once when the node is removed; releases backend
    /// resources.
    fn on_exit(&mut self, graph: &mut RenderGraph, backend: &mut dyn RenderBackend) {
        let _ = (graph, backend);
    }

    /// Called after deserialization, before the first run pass, to recreate
    /// backend resources using already-restored pin ids.
    fn on_load(&mut self, graph: &mut RenderGraph, backend: &mut dyn RenderBackend) {
        let _ = (graph, backend);
    }

    /// Execute this node's computation for the current frame.
    ///
    /// Reads required inputs via [`RenderGraph::get_pin_data`] and writes
    /// outputs via [`RenderGraph::set_pin_data`]. When required inputs are
    /// absent the node must not write garbage output: it leaves its output
    /// empty, and calls [`RenderGraph::stop`] only if the failure is fatal
    /// to the whole pass.
    fn run(
        &mut self,
        graph: &mut RenderGraph,
        backend: &mut dyn RenderBackend,
        assets: &AssetStore,
    );

    /// Produce the type-specific fields for persistence.
    fn save_state(&self) -> Result<serde_json::Value, PersistError>;

    /// Assemble the full persisted record for this node.
    fn save(&self) -> Result<NodeRecord, PersistError> {
        Ok(NodeRecord {
            node_type: self.type_name().to_owned(),
            node_id: self.id(),
            position: self.position(),
            state: self.save_state()?,
        })
    }

    /// Presentation hook; the host passes its own drawing context.
    ///
    /// Default is a no-op - the engine does not own presentation. Structural
    /// mutation from inside a render hook must go through the same graph
    /// APIs as everywhere else.
    fn render(&mut self, ui: &mut dyn Any) {
        let _ = ui;
    }

    /// Downcast support for hosts that need the concrete node type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
