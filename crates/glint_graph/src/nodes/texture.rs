// SPDX-License-Identifier: MIT OR Apache-2.0
//! Texture node - publishes a handle resolved from a selected texture asset.

use crate::backend::RenderBackend;
use crate::data::{Data, DataKind};
use crate::graph::RenderGraph;
use crate::node::{Node, NodeId, NodeRecord};
use crate::persist::PersistError;
use crate::pin::PinId;
use glint_assets::{AssetId, AssetStore};
use serde::{Deserialize, Serialize};

/// Registry key for [`TextureNode`].
pub const TEXTURE_TYPE: &str = "texture";

#[derive(Debug, Serialize, Deserialize)]
struct TextureState {
    output: PinId,
    texture: Option<AssetId>,
}

/// Outputs the Texture2D handle of a user-selected texture asset.
///
/// Outputs nothing while no texture is selected or the selected id is
/// unknown to the asset store - neither condition halts the pass.
#[derive(Debug)]
pub struct TextureNode {
    id: NodeId,
    position: [f32; 2],
    output: PinId,
    texture: Option<AssetId>,
}

impl TextureNode {
    /// Create a texture node with no selection, ready for insertion.
    pub fn new() -> Box<Self> {
        Box::new(Self {
            id: NodeId(0),
            position: [0.0, 0.0],
            output: PinId(0),
            texture: None,
        })
    }

    /// The selected texture asset, if any.
    pub fn texture(&self) -> Option<AssetId> {
        self.texture
    }

    /// Select (or clear) the texture asset.
    pub fn set_texture(&mut self, texture: Option<AssetId>) {
        self.texture = texture;
    }

    /// The Texture2D output pin.
    pub fn output_pin(&self) -> PinId {
        self.output
    }

    pub(crate) fn from_record(record: &NodeRecord) -> Result<Box<dyn Node>, PersistError> {
        let state: TextureState = serde_json::from_value(record.state.clone())?;
        Ok(Box::new(Self {
            id: record.node_id,
            position: record.position,
            output: state.output,
            texture: state.texture,
        }))
    }
}

impl Node for TextureNode {
    fn type_name(&self) -> &'static str {
        TEXTURE_TYPE
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
        node.texture = self.texture;
        node
    }

    fn layout(&self) -> Vec<PinId> {
        vec![self.output]
    }

    fn on_enter(&mut self, graph: &mut RenderGraph) {
        self.output = graph.register_pin(self.id, DataKind::Texture2D);
    }

    fn run(
        &mut self,
        graph: &mut RenderGraph,
        _backend: &mut dyn RenderBackend,
        assets: &AssetStore,
    ) {
        let handle = self
            .texture
            .and_then(|id| assets.texture(id))
            .map(|asset| asset.handle);
        if let Some(handle) = handle {
            graph.set_pin_data(self.output, Data::Texture2D(handle));
        }
    }

    fn save_state(&self) -> Result<serde_json::Value, PersistError> {
        Ok(serde_json::to_value(TextureState {
            output: self.output,
            texture: self.texture,
        })?)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
