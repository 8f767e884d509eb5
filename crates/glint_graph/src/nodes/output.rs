// SPDX-License-Identifier: MIT OR Apache-2.0
//! The output node - the graph's designated sink.

use crate::backend::RenderBackend;
use crate::data::DataKind;
use crate::graph::RenderGraph;
use crate::node::{Node, NodeId, NodeRecord};
use crate::persist::PersistError;
use crate::pin::PinId;
use glint_assets::{AssetStore, TextureHandle};
use serde::{Deserialize, Serialize};

/// Registry key for [`OutputNode`].
pub const OUTPUT_TYPE: &str = "output";

#[derive(Debug, Serialize, Deserialize)]
struct OutputState {
    input: PinId,
}

/// The sink whose input becomes the frame's final image.
///
/// Claims the graph root on insertion; toggling which output node is root is
/// the only user action that changes the evaluation sink. Each run it copies
/// its input into [`OutputNode::current_image`]. When nothing is connected
/// it logs the condition once and stays silent until connectivity is
/// restored.
#[derive(Debug)]
pub struct OutputNode {
    id: NodeId,
    position: [f32; 2],
    input: PinId,
    current_image: Option<TextureHandle>,
    warned_disconnected: bool,
}

impl OutputNode {
    /// Create an output node ready for insertion.
    pub fn new() -> Box<Self> {
        Box::new(Self {
            id: NodeId(0),
            position: [0.0, 0.0],
            input: PinId(0),
            current_image: None,
            warned_disconnected: false,
        })
    }

    /// The image produced by the most recent pass, if any.
    pub fn current_image(&self) -> Option<TextureHandle> {
        self.current_image
    }

    /// The Texture2D input pin.
    pub fn input_pin(&self) -> PinId {
        self.input
    }

    pub(crate) fn from_record(record: &NodeRecord) -> Result<Box<dyn Node>, PersistError> {
        let state: OutputState = serde_json::from_value(record.state.clone())?;
        Ok(Box::new(Self {
            id: record.node_id,
            position: record.position,
            input: state.input,
            current_image: None,
            warned_disconnected: false,
        }))
    }
}

impl Node for OutputNode {
    fn type_name(&self) -> &'static str {
        OUTPUT_TYPE
    }

    fn id(&self) -> NodeId {
        self.id
    }

    fn set_id(&mut self, id: NodeId) {
        self.id = id;
    }

    fn position(&self) -> [f32; 2] {
        self.position
    }

    fn set_position(&mut self, position: [f32; 2]) {
        self.position = position;
    }

    fn clone_node(&self) -> Box<dyn Node> {
        let mut node = Self::new();
        node.position = self.position;
        node
    }

    fn layout(&self) -> Vec<PinId> {
        vec![self.input]
    }

    fn on_enter(&mut self, graph: &mut RenderGraph) {
        self.input = graph.register_pin(self.id, DataKind::Texture2D);
        graph.set_root(self.id);
    }

    fn run(
        &mut self,
        graph: &mut RenderGraph,
        _backend: &mut dyn RenderBackend,
        _assets: &AssetStore,
    ) {
        match graph.get_pin_data(self.input).try_get::<TextureHandle>() {
            Some(handle) => {
                self.current_image = Some(handle);
                self.warned_disconnected = false;
            }
            None => {
                self.current_image = None;
                if !self.warned_disconnected {
                    tracing::warn!(node = %self.id, "output node has no image connected");
                    self.warned_disconnected = true;
                }
            }
        }
    }

    fn save_state(&self) -> Result<serde_json::Value, PersistError> {
        Ok(serde_json::to_value(OutputState { input: self.input })?)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessBackend;
    use glint_assets::AssetId;

    #[test]
    fn test_output_claims_root_on_enter() {
        let mut graph = RenderGraph::new(AssetId(0));
        let id = graph.insert_node(OutputNode::new());
        assert_eq!(graph.root(), Some(id));
    }

    #[test]
    fn test_disconnected_warning_fires_once_and_rearms() {
        let mut graph = RenderGraph::new(AssetId(0));
        let mut backend = HeadlessBackend::new();
        let assets = AssetStore::new();
        let id = graph.insert_node(OutputNode::new());
        let input = graph.node(id).unwrap().layout()[0];

        graph.evaluate(&mut backend, &assets);
        graph.evaluate(&mut backend, &assets);
        let warned = |graph: &RenderGraph| {
            graph
                .node(id)
                .unwrap()
                .as_any()
                .downcast_ref::<OutputNode>()
                .unwrap()
                .warned_disconnected
        };
        assert!(warned(&graph));

        // Connectivity restored: image copied, warning re-armed.
        graph.set_pin_data(input, crate::Data::Texture2D(TextureHandle(5)));
        graph.evaluate(&mut backend, &assets);
        // evaluate() cleared nothing here; the pin still carries the handle
        // because no upstream pass rewrote it.
        let node = graph
            .node(id)
            .unwrap()
            .as_any()
            .downcast_ref::<OutputNode>()
            .unwrap();
        assert_eq!(node.current_image(), Some(TextureHandle(5)));
        assert!(!node.warned_disconnected);
    }
}
