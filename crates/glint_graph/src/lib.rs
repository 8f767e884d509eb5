// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame-driven shader node-graph engine.
//!
//! A [`RenderGraph`] is a directed acyclic graph of typed computation units
//! ([`Node`]s) connected through typed data ports ([`Pin`]s) and directed
//! [`Edge`]s. Once per frame the host calls [`RenderGraph::evaluate`], which
//! walks the graph upstream from the designated root (sink) node and runs
//! every producer before the consumer that reads it, moving [`Data`] values
//! across edges until the root has produced the frame's final image.
//!
//! ## Architecture
//!
//! The engine is built on arena-style ownership:
//! - Flat identity tables (id -> node / pin / edge) owned exclusively by the
//!   graph; everything else refers to entries by id.
//! - An object-safe [`Node`] contract with lifecycle hooks
//!   (`on_enter` / `on_exit` / `on_load` / `run`) and a string-keyed
//!   [`NodeRegistry`] for reconstruction from persisted records.
//! - Narrow collaborator seams: GPU work goes through the
//!   [`RenderBackend`] capability trait, asset resolution through
//!   [`glint_assets::AssetStore`]. Neither is implemented here.
//!
//! Everything is single-threaded and cooperative: a node may call
//! [`RenderGraph::stop`] to halt the remainder of the current pass, and a
//! slow node simply stalls the frame.

pub mod backend;
pub mod data;
pub mod edge;
pub mod graph;
pub mod headless;
pub mod node;
pub mod nodes;
pub mod persist;
pub mod pin;
pub mod registry;

pub use backend::{BackendError, RenderBackend, TargetId};
pub use data::{Data, DataError, DataKind};
pub use edge::{Edge, EdgeId};
pub use graph::{GraphError, RenderGraph};
pub use node::{Node, NodeId, NodeRecord};
pub use pin::{Pin, PinId};
pub use registry::NodeRegistry;

pub use glint_assets::{AssetId, AssetStore, TextureHandle};
