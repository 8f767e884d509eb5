// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fragment-shader node - rasterizes the graph's shared geometry through a
//! user-selected shader into an offscreen target.

use crate::backend::RenderBackend;
use crate::data::DataKind;
use crate::graph::{GraphError, RenderGraph};
use crate::node::{Node, NodeId, NodeRecord};
use crate::persist::PersistError;
use crate::pin::PinId;
use crate::Data;
use glint_assets::{AssetId, AssetStore};
use serde::{Deserialize, Serialize};

/// Registry key for [`FragmentNode`].
pub const FRAGMENT_TYPE: &str = "fragment";

/// A declared uniform port: a typed, named input pin addable and removable
/// at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniformPin {
    /// The input pin carrying the uniform's value
    pub pin: PinId,
    /// Uniform identifier in the shader source
    pub name: String,
    /// Declared value kind
    pub kind: DataKind,
}

#[derive(Debug, Serialize, Deserialize)]
struct FragmentState {
    output: PinId,
    shader: Option<AssetId>,
    uniforms: Vec<UniformPin>,
}

/// Runs a fragment shader over the graph's full-viewport geometry.
///
/// Per run: with no shader selected the pass halts. An uncompiled shader is
/// compiled on the spot; on failure the node logs once (deduplicated until
/// the condition changes) and halts the pass - the compile is retried next
/// frame, so fixing the source recovers automatically. On success it binds
/// an offscreen target sized to the viewport, uploads every uniform whose
/// pin holds a value (silently skipping empty ones), draws, and publishes
/// the target's texture handle on its output pin.
#[derive(Debug)]
pub struct FragmentNode {
    id: NodeId,
    position: [f32; 2],
    output: PinId,
    shader: Option<AssetId>,
    uniforms: Vec<UniformPin>,
    target: Option<crate::backend::TargetId>,
    last_error: Option<String>,
}

impl FragmentNode {
    /// Create a fragment node with no shader and no uniforms.
    pub fn new() -> Box<Self> {
        Box::new(Self {
            id: NodeId(0),
            position: [0.0, 0.0],
            output: PinId(0),
            shader: None,
            uniforms: Vec::new(),
            target: None,
            last_error: None,
        })
    }

    /// The selected shader asset, if any.
    pub fn shader(&self) -> Option<AssetId> {
        self.shader
    }

    /// Select (or clear) the shader. Clears the deduplicated error state so
    /// a problem with the new selection is reported afresh.
    pub fn set_shader(&mut self, shader: Option<AssetId>) {
        self.shader = shader;
        self.last_error = None;
    }

    /// The Texture2D output pin.
    pub fn output_pin(&self) -> PinId {
        self.output
    }

    /// The declared uniform ports, in declaration order.
    pub fn uniforms(&self) -> &[UniformPin] {
        &self.uniforms
    }

    /// The most recent deduplicated failure, if the condition persists.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Declare a new typed uniform port, registering its input pin.
    pub fn add_uniform(
        &mut self,
        graph: &mut RenderGraph,
        name: impl Into<String>,
        kind: DataKind,
    ) -> PinId {
        let pin = graph.register_pin(self.id, kind);
        self.uniforms.push(UniformPin {
            pin,
            name: name.into(),
            kind,
        });
        pin
    }

    /// Retire a uniform port, deleting its pin (and any edges into it).
    pub fn remove_uniform(&mut self, graph: &mut RenderGraph, pin: PinId) -> Result<(), GraphError> {
        graph.delete_pin(pin)?;
        self.uniforms.retain(|u| u.pin != pin);
        Ok(())
    }

    pub(crate) fn from_record(record: &NodeRecord) -> Result<Box<dyn Node>, PersistError> {
        let state: FragmentState = serde_json::from_value(record.state.clone())?;
        Ok(Box::new(Self {
            id: record.node_id,
            position: record.position,
            output: state.output,
            shader: state.shader,
            uniforms: state.uniforms,
            target: None,
            last_error: None,
        }))
    }

    /// Log `message` and halt the pass, suppressing repeats while the same
    /// condition persists.
    fn fail(&mut self, graph: &mut RenderGraph, message: String) {
        if self.last_error.as_deref() != Some(message.as_str()) {
            tracing::warn!(node = %self.id, "{message}");
            self.last_error = Some(message);
        }
        graph.stop();
    }

    fn ensure_target(
        &mut self,
        backend: &mut dyn RenderBackend,
    ) -> Result<crate::backend::TargetId, crate::backend::BackendError> {
        match self.target {
            Some(target) => Ok(target),
            None => {
                let target = backend.create_target()?;
                self.target = Some(target);
                Ok(target)
            }
        }
    }
}

impl Node for FragmentNode {
    fn type_name(&self) -> &'static str {
        FRAGMENT_TYPE
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
        // Uniform declarations travel with the copy; pin ids are
        // reestablished by on_enter, backend resources are not shared.
        let mut node = Self::new();
        node.position = self.position;
        node.shader = self.shader;
        node.uniforms = self.uniforms.clone();
        node
    }

    fn layout(&self) -> Vec<PinId> {
        let mut pins: Vec<PinId> = self.uniforms.iter().map(|u| u.pin).collect();
        pins.push(self.output);
        pins
    }

    fn on_enter(&mut self, graph: &mut RenderGraph) {
        self.output = graph.register_pin(self.id, DataKind::Texture2D);
        // A pasted copy arrives with uniform declarations but stale pin ids;
        // register a fresh pin per declared port.
        for uniform in &mut self.uniforms {
            uniform.pin = graph.register_pin(self.id, uniform.kind);
        }
    }

    fn on_exit(&mut self, _graph: &mut RenderGraph, backend: &mut dyn RenderBackend) {
        if let Some(target) = self.target.take() {
            backend.destroy_target(target);
        }
    }

    fn on_load(&mut self, _graph: &mut RenderGraph, backend: &mut dyn RenderBackend) {
        // The offscreen target is not serializable; recreate it now so the
        // first pass after a load draws into a live framebuffer.
        match backend.create_target() {
            Ok(target) => self.target = Some(target),
            Err(e) => {
                tracing::warn!(node = %self.id, "failed to recreate render target: {e}");
            }
        }
    }

    fn run(
        &mut self,
        graph: &mut RenderGraph,
        backend: &mut dyn RenderBackend,
        assets: &AssetStore,
    ) {
        let Some(shader_id) = self.shader else {
            self.fail(graph, "no shader selected".to_owned());
            return;
        };
        let Some(shader) = assets.shader(shader_id) else {
            self.fail(graph, format!("shader {shader_id} not found"));
            return;
        };

        if !backend.is_compiled(shader_id) {
            if let Err(e) = backend.compile(shader, graph.geometry()) {
                self.fail(graph, format!("shader '{}': {e}", shader.name));
                return;
            }
        }
        self.last_error = None;

        backend.use_shader(shader_id);

        let target = match self.ensure_target(backend) {
            Ok(target) => target,
            Err(e) => {
                self.fail(graph, e.to_string());
                return;
            }
        };
        let [width, height] = graph.viewport_resolution();
        if let Err(e) = backend.bind_output(target, width as u32, height as u32) {
            self.fail(graph, e.to_string());
            return;
        }

        for uniform in &self.uniforms {
            let data = graph.get_pin_data(uniform.pin);
            // An unconnected uniform is not an error; leave it unset.
            if data.is_some() {
                backend.set_uniform(&uniform.name, &data);
            }
        }

        backend.draw(graph.geometry());

        if let Some(handle) = backend.target_texture(target) {
            graph.set_pin_data(self.output, Data::Texture2D(handle));
        }
    }

    fn save_state(&self) -> Result<serde_json::Value, PersistError> {
        Ok(serde_json::to_value(FragmentState {
            output: self.output,
            shader: self.shader,
            uniforms: self.uniforms.clone(),
        })?)
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

    fn fragment_mut(graph: &mut RenderGraph, id: NodeId) -> &mut FragmentNode {
        graph
            .node_mut(id)
            .unwrap()
            .as_any_mut()
            .downcast_mut::<FragmentNode>()
            .unwrap()
    }

    #[test]
    fn test_compile_failure_logs_once_until_condition_changes() {
        let mut assets = AssetStore::new();
        let shader = assets.add_shader("broken", "not glsl");
        let mut graph = RenderGraph::new(assets.add_geometry("quad"));
        let mut backend = HeadlessBackend::new();
        backend.set_compile_failure(shader, "syntax error at line 1");

        let id = graph.insert_root_node(FragmentNode::new());
        fragment_mut(&mut graph, id).set_shader(Some(shader));

        graph.evaluate(&mut backend, &assets);
        let first = fragment_mut(&mut graph, id).last_error().map(str::to_owned);
        assert!(first.is_some());

        // Same condition next frame: dedup keeps the message, retry happens.
        graph.evaluate(&mut backend, &assets);
        assert_eq!(
            fragment_mut(&mut graph, id).last_error().map(str::to_owned),
            first
        );
        assert_eq!(backend.compile_calls.len(), 2);

        // Source fixed: the next frame recovers and clears the error.
        backend.clear_compile_failure(shader);
        graph.evaluate(&mut backend, &assets);
        assert!(fragment_mut(&mut graph, id).last_error().is_none());
        assert!(!graph.stopped());
    }

    fn add_uniform(graph: &mut RenderGraph, id: NodeId, name: &str, kind: DataKind) -> PinId {
        graph
            .with_node(id, |node, graph| {
                node.as_any_mut()
                    .downcast_mut::<FragmentNode>()
                    .unwrap()
                    .add_uniform(graph, name, kind)
            })
            .unwrap()
    }

    #[test]
    fn test_uniform_declarations_survive_cloning_with_fresh_pins() {
        let mut graph = RenderGraph::new(glint_assets::AssetId(0));
        let id = graph.insert_node(FragmentNode::new());
        let original_pin = add_uniform(&mut graph, id, "u_time", DataKind::Float);

        let copy = graph.node(id).unwrap().clone_node();
        let copy_id = graph.insert_node(copy);

        let copy_node = graph
            .node(copy_id)
            .unwrap()
            .as_any()
            .downcast_ref::<FragmentNode>()
            .unwrap();
        assert_eq!(copy_node.uniforms().len(), 1);
        assert_eq!(copy_node.uniforms()[0].name, "u_time");
        assert_eq!(copy_node.uniforms()[0].kind, DataKind::Float);
        assert_ne!(copy_node.uniforms()[0].pin, original_pin);
        // The fresh pin is live in the graph.
        assert!(graph.pin(copy_node.uniforms()[0].pin).is_some());
    }

    #[test]
    fn test_remove_uniform_retires_the_pin() {
        let mut graph = RenderGraph::new(glint_assets::AssetId(0));
        let id = graph.insert_node(FragmentNode::new());
        let pin = add_uniform(&mut graph, id, "u_scale", DataKind::Vec2);

        graph
            .with_node(id, |node, graph| {
                node.as_any_mut()
                    .downcast_mut::<FragmentNode>()
                    .unwrap()
                    .remove_uniform(graph, pin)
            })
            .unwrap()
            .unwrap();

        assert!(graph.pin(pin).is_none());
        let node = graph
            .node(id)
            .unwrap()
            .as_any()
            .downcast_ref::<FragmentNode>()
            .unwrap();
        assert!(node.uniforms().is_empty());
    }
}
