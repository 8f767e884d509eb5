// SPDX-License-Identifier: MIT OR Apache-2.0
//! Source nodes fed from graph state: elapsed time and viewport resolution.

use crate::backend::RenderBackend;
use crate::data::{Data, DataKind};
use crate::graph::RenderGraph;
use crate::node::{Node, NodeId, NodeRecord};
use crate::persist::PersistError;
use crate::pin::PinId;
use glint_assets::AssetStore;
use serde::{Deserialize, Serialize};

/// Registry key for [`TimeNode`].
pub const TIME_TYPE: &str = "time";

/// Registry key for [`ViewportNode`].
pub const VIEWPORT_TYPE: &str = "viewport";

#[derive(Debug, Serialize, Deserialize)]
struct SourceState {
    output: PinId,
}

/// Outputs the graph's accumulated time as a Float each run.
#[derive(Debug)]
pub struct TimeNode {
    id: NodeId,
    position: [f32; 2],
    output: PinId,
}

impl TimeNode {
    /// Create a time node ready for insertion.
    pub fn new() -> Box<Self> {
        Box::new(Self {
            id: NodeId(0),
            position: [0.0, 0.0],
            output: PinId(0),
        })
    }

    /// The Float output pin.
    pub fn output_pin(&self) -> PinId {
        self.output
    }

    pub(crate) fn from_record(record: &NodeRecord) -> Result<Box<dyn Node>, PersistError> {
        let state: SourceState = serde_json::from_value(record.state.clone())?;
        Ok(Box::new(Self {
            id: record.node_id,
            position: record.position,
            output: state.output,
        }))
    }
}

impl Node for TimeNode {
    fn type_name(&self) -> &'static str {
        TIME_TYPE
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
        vec![self.output]
    }

    fn on_enter(&mut self, graph: &mut RenderGraph) {
        self.output = graph.register_pin(self.id, DataKind::Float);
    }

    fn run(
        &mut self,
        graph: &mut RenderGraph,
        _backend: &mut dyn RenderBackend,
        _assets: &AssetStore,
    ) {
        let time = graph.time();
        graph.set_pin_data(self.output, Data::Float(time));
    }

    fn save_state(&self) -> Result<serde_json::Value, PersistError> {
        Ok(serde_json::to_value(SourceState {
            output: self.output,
        })?)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Outputs the current viewport resolution as a Vec2 each run.
#[derive(Debug)]
pub struct ViewportNode {
    id: NodeId,
    position: [f32; 2],
    output: PinId,
}

impl ViewportNode {
    /// Create a viewport node ready for insertion.
    pub fn new() -> Box<Self> {
        Box::new(Self {
            id: NodeId(0),
            position: [0.0, 0.0],
            output: PinId(0),
        })
    }

    /// The Vec2 output pin.
    pub fn output_pin(&self) -> PinId {
        self.output
    }

    pub(crate) fn from_record(record: &NodeRecord) -> Result<Box<dyn Node>, PersistError> {
        let state: SourceState = serde_json::from_value(record.state.clone())?;
        Ok(Box::new(Self {
            id: record.node_id,
            position: record.position,
            output: state.output,
        }))
    }
}

impl Node for ViewportNode {
    fn type_name(&self) -> &'static str {
        VIEWPORT_TYPE
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
        vec![self.output]
    }

    fn on_enter(&mut self, graph: &mut RenderGraph) {
        self.output = graph.register_pin(self.id, DataKind::Vec2);
    }

    fn run(
        &mut self,
        graph: &mut RenderGraph,
        _backend: &mut dyn RenderBackend,
        _assets: &AssetStore,
    ) {
        let resolution = graph.viewport_resolution();
        graph.set_pin_data(self.output, Data::Vec2(resolution));
    }

    fn save_state(&self) -> Result<serde_json::Value, PersistError> {
        Ok(serde_json::to_value(SourceState {
            output: self.output,
        })?)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
