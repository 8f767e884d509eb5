// SPDX-License-Identifier: MIT OR Apache-2.0
//! Builds a small shader graph and evaluates a few frames without a GPU.
//!
//! Run with `cargo run -p glint_graph --example headless`; set `RUST_LOG`
//! to see the engine's tracing output.

use glint_graph::headless::HeadlessBackend;
use glint_graph::nodes::{FloatNode, FragmentNode, OutputNode, TimeNode};
use glint_graph::{AssetStore, DataKind, Node, RenderGraph};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("glint_graph=debug".parse().unwrap());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut assets = AssetStore::new();
    let geometry = assets.add_geometry("fullscreen quad");
    let shader = assets.add_shader(
        "pulse",
        "uniform float u_time; uniform float u_speed; void main() {}",
    );

    let mut graph = RenderGraph::new(geometry);
    let mut backend = HeadlessBackend::new();

    let time = graph.insert_node(TimeNode::new());
    let speed = graph.insert_node(FloatNode::with_value(2.0));
    let fragment = graph.insert_node(FragmentNode::new());
    let output = graph.insert_root_node(OutputNode::new());

    // Wire: Time -> u_time, Float -> u_speed, Fragment -> Output.
    let (u_time, u_speed) = graph
        .with_node(fragment, |node, graph| {
            let node = node.as_any_mut().downcast_mut::<FragmentNode>().unwrap();
            node.set_shader(Some(shader));
            (
                node.add_uniform(graph, "u_time", DataKind::Float),
                node.add_uniform(graph, "u_speed", DataKind::Float),
            )
        })
        .unwrap();

    let time_out = graph.node(time).unwrap().layout()[0];
    let speed_out = graph.node(speed).unwrap().layout()[0];
    let fragment_out = graph
        .node(fragment)
        .and_then(|n| n.as_any().downcast_ref::<FragmentNode>())
        .map(FragmentNode::output_pin)
        .unwrap();
    let output_in = graph.node(output).unwrap().layout()[0];
    graph.insert_edge(time_out, u_time).unwrap();
    graph.insert_edge(speed_out, u_speed).unwrap();
    graph.insert_edge(fragment_out, output_in).unwrap();

    for frame in 0..4 {
        graph.advance_time(1.0 / 60.0);
        graph.clear_graph_data();
        graph.evaluate(&mut backend, &assets);

        let image = graph
            .node(output)
            .and_then(|n| n.as_any().downcast_ref::<OutputNode>())
            .and_then(OutputNode::current_image);
        match image {
            Some(handle) => {
                tracing::info!(frame, time = graph.time(), image = %handle, "frame rendered")
            }
            None => tracing::warn!(frame, "no image this frame"),
        }
    }

    tracing::info!(
        uniforms = backend.uniform_calls.len(),
        draws = backend.draw_calls.len(),
        "done"
    );
}
