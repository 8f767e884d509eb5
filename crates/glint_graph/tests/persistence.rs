// SPDX-License-Identifier: MIT OR Apache-2.0
//! Save/load round-trips through the node registry.

use glint_graph::headless::HeadlessBackend;
use glint_graph::nodes::{
    FloatNode, FragmentNode, OutputNode, TextureNode, TimeNode, Vec2Node, ViewportNode,
};
use glint_graph::persist::{load_graph, save_graph, GraphRecord, PersistError};
use glint_graph::registry::{builtin_registry, NodeRegistry};
use glint_graph::{AssetStore, DataKind, Node, NodeId, RenderGraph, TextureHandle};

fn node<T: 'static>(graph: &RenderGraph, id: NodeId) -> &T {
    graph
        .node(id)
        .unwrap()
        .as_any()
        .downcast_ref::<T>()
        .unwrap()
}

/// One graph exercising every built-in node type.
fn build_fixture() -> (RenderGraph, AssetStore, HeadlessBackend) {
    let mut assets = AssetStore::new();
    let geometry = assets.add_geometry("quad");
    let shader = assets.add_shader("blend", "void main() {}");
    let noise = assets.add_texture("noise", TextureHandle(900));

    let mut graph = RenderGraph::new(geometry);
    let time = graph.insert_node(TimeNode::new());
    let viewport = graph.insert_node(ViewportNode::new());
    let speed = graph.insert_node(FloatNode::with_value(2.5));
    let offset = graph.insert_node(Vec2Node::with_value([0.5, -0.5]));
    let texture = graph.insert_node(TextureNode::new());
    let fragment = graph.insert_node(FragmentNode::new());
    let output = graph.insert_root_node(OutputNode::new());

    graph.with_node(texture, |n, _| {
        n.as_any_mut()
            .downcast_mut::<TextureNode>()
            .unwrap()
            .set_texture(Some(noise));
    });
    let (u_time, u_res, u_speed, u_offset, u_noise) = graph
        .with_node(fragment, |n, graph| {
            let n = n.as_any_mut().downcast_mut::<FragmentNode>().unwrap();
            n.set_shader(Some(shader));
            (
                n.add_uniform(graph, "u_time", DataKind::Float),
                n.add_uniform(graph, "u_resolution", DataKind::Vec2),
                n.add_uniform(graph, "u_speed", DataKind::Float),
                n.add_uniform(graph, "u_offset", DataKind::Vec2),
                n.add_uniform(graph, "u_noise", DataKind::Texture2D),
            )
        })
        .unwrap();

    graph
        .insert_edge(node::<TimeNode>(&graph, time).output_pin(), u_time)
        .unwrap();
    graph
        .insert_edge(node::<ViewportNode>(&graph, viewport).output_pin(), u_res)
        .unwrap();
    graph
        .insert_edge(node::<FloatNode>(&graph, speed).output_pin(), u_speed)
        .unwrap();
    graph
        .insert_edge(node::<Vec2Node>(&graph, offset).output_pin(), u_offset)
        .unwrap();
    graph
        .insert_edge(node::<TextureNode>(&graph, texture).output_pin(), u_noise)
        .unwrap();
    graph
        .insert_edge(
            node::<FragmentNode>(&graph, fragment).output_pin(),
            node::<OutputNode>(&graph, output).input_pin(),
        )
        .unwrap();

    graph.node_mut(fragment).unwrap().set_position([320.0, 40.0]);
    (graph, assets, HeadlessBackend::new())
}

fn round_trip(graph: &RenderGraph, backend: &mut HeadlessBackend) -> RenderGraph {
    let record = save_graph(graph).unwrap();
    let text = ron::ser::to_string_pretty(&record, ron::ser::PrettyConfig::default()).unwrap();
    let record: GraphRecord = ron::from_str(&text).unwrap();
    load_graph(&record, &builtin_registry(), backend).unwrap()
}

#[test]
fn round_trip_preserves_tables_and_identity() {
    let (graph, _assets, mut backend) = build_fixture();
    let restored = round_trip(&graph, &mut backend);

    assert_eq!(restored.geometry(), graph.geometry());
    assert_eq!(restored.root(), graph.root());
    assert_eq!(restored.node_count(), graph.node_count());
    assert_eq!(restored.pins().count(), graph.pins().count());
    assert_eq!(restored.edges().count(), graph.edges().count());

    for (before, after) in graph.nodes().zip(restored.nodes()) {
        assert_eq!(before.id(), after.id());
        assert_eq!(before.type_name(), after.type_name());
        assert_eq!(before.position(), after.position());
    }
    for (before, after) in graph.pins().zip(restored.pins()) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.node, after.node);
        assert_eq!(before.kind, after.kind);
    }
    for (before, after) in graph.edges().zip(restored.edges()) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.from, after.from);
        assert_eq!(before.to, after.to);
    }
}

#[test]
fn round_trip_preserves_node_state() {
    let (graph, _assets, mut backend) = build_fixture();
    let restored = round_trip(&graph, &mut backend);

    let literals: Vec<&FloatNode> = restored
        .nodes()
        .filter_map(|n| n.as_any().downcast_ref::<FloatNode>())
        .collect();
    assert_eq!(literals.len(), 1);
    assert_eq!(literals[0].value(), 2.5);

    let vec2 = restored
        .nodes()
        .find_map(|n| n.as_any().downcast_ref::<Vec2Node>())
        .unwrap();
    assert_eq!(vec2.value(), [0.5, -0.5]);

    let before = graph
        .nodes()
        .find_map(|n| n.as_any().downcast_ref::<FragmentNode>())
        .unwrap();
    let after = restored
        .nodes()
        .find_map(|n| n.as_any().downcast_ref::<FragmentNode>())
        .unwrap();
    assert_eq!(after.shader(), before.shader());
    assert_eq!(after.uniforms().len(), before.uniforms().len());
    for (b, a) in before.uniforms().iter().zip(after.uniforms()) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.pin, b.pin);
    }

    let texture = restored
        .nodes()
        .find_map(|n| n.as_any().downcast_ref::<TextureNode>())
        .unwrap();
    assert_eq!(texture.texture(), graph
        .nodes()
        .find_map(|n| n.as_any().downcast_ref::<TextureNode>())
        .unwrap()
        .texture());
}

#[test]
fn restored_graph_evaluates_like_the_original() {
    let (mut graph, assets, mut backend) = build_fixture();
    graph.set_time(3.0);
    graph.clear_graph_data();
    graph.evaluate(&mut backend, &assets);
    let stopped_before = graph.stopped();

    // Load against a fresh backend; on_load recreates the render target
    // there, so the restored graph must keep evaluating with that backend.
    let mut fresh_backend = HeadlessBackend::new();
    let mut restored = round_trip(&graph, &mut fresh_backend);
    restored.set_time(3.0);
    restored.clear_graph_data();
    restored.evaluate(&mut fresh_backend, &assets);

    assert_eq!(restored.stopped(), stopped_before);
    assert!(!restored.stopped());
    assert_eq!(fresh_backend.draw_calls.len(), 1);
    let output = restored
        .nodes()
        .find_map(|n| n.as_any().downcast_ref::<OutputNode>())
        .unwrap();
    assert!(output.current_image().is_some());
    // The time uniform carried the restored clock value.
    assert!(fresh_backend
        .uniform_calls
        .iter()
        .any(|c| c.name == "u_time" && c.value.try_get::<f32>() == Some(3.0)));
}

#[test]
fn loading_recreates_backend_targets_eagerly() {
    let (graph, _assets, mut backend) = build_fixture();
    let restored = round_trip(&graph, &mut backend);

    // The fragment node's on_load allocated its render target up front.
    assert_eq!(backend.target_count(), 1);
    drop(restored);
}

#[test]
fn ids_never_recycle_after_a_round_trip() {
    let (graph, _assets, mut backend) = build_fixture();
    let highest = graph.nodes().map(|n| n.id()).max().unwrap();

    let mut restored = round_trip(&graph, &mut backend);
    let fresh = restored.insert_node(FloatNode::new());
    assert!(fresh > highest);
}

#[test]
fn unknown_node_type_is_rejected() {
    let (graph, _assets, mut backend) = build_fixture();
    let mut record = save_graph(&graph).unwrap();
    record.nodes[0].node_type = "holo_projector".to_owned();

    let err = load_graph(&record, &builtin_registry(), &mut backend).unwrap_err();
    assert!(matches!(err, PersistError::UnknownNodeType(name) if name == "holo_projector"));
}

#[test]
fn an_empty_registry_accepts_nothing() {
    let (graph, _assets, mut backend) = build_fixture();
    let record = save_graph(&graph).unwrap();

    let err = load_graph(&record, &NodeRegistry::new(), &mut backend).unwrap_err();
    assert!(matches!(err, PersistError::UnknownNodeType(_)));
}
