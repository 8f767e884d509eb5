// SPDX-License-Identifier: MIT OR Apache-2.0
//! Literal value nodes.
//!
//! Edits are committed, not streamed: the host calls `commit_value` when an
//! edit gesture finishes and receives the old/new pair to feed its own undo
//! mechanism. The engine does not keep history.

use crate::backend::RenderBackend;
use crate::data::{Data, DataKind};
use crate::graph::RenderGraph;
use crate::node::{Node, NodeId, NodeRecord};
use crate::persist::PersistError;
use crate::pin::PinId;
use glint_assets::AssetStore;
use serde::{Deserialize, Serialize};

/// Registry key for [`FloatNode`].
pub const FLOAT_TYPE: &str = "float";

/// Registry key for [`Vec2Node`].
pub const VEC2_TYPE: &str = "vec2";

/// An old/new pair produced by committing a value edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueEdit<T> {
    /// Value before the edit
    pub old: T,
    /// Value after the edit
    pub new: T,
}

#[derive(Debug, Serialize, Deserialize)]
struct LiteralState<T> {
    output: PinId,
    value: T,
}

macro_rules! literal_node {
    ($name:ident, $ty:ty, $kind:ident, $type_key:expr, $default:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug)]
        pub struct $name {
            id: NodeId,
            position: [f32; 2],
            output: PinId,
            value: $ty,
        }

        impl $name {
            /// Create a node with the default literal, ready for insertion.
            pub fn new() -> Box<Self> {
                Self::with_value($default)
            }

            /// Create a node with a specific literal.
            pub fn with_value(value: $ty) -> Box<Self> {
                Box::new(Self {
                    id: NodeId(0),
                    position: [0.0, 0.0],
                    output: PinId(0),
                    value,
                })
            }

            /// The current literal.
            pub fn value(&self) -> $ty {
                self.value
            }

            /// The output pin.
            pub fn output_pin(&self) -> PinId {
                self.output
            }

            /// Commit an edit, returning the old/new pair for external undo.
            pub fn commit_value(&mut self, value: $ty) -> ValueEdit<$ty> {
                let edit = ValueEdit {
                    old: self.value,
                    new: value,
                };
                self.value = value;
                edit
            }

            pub(crate) fn from_record(
                record: &NodeRecord,
            ) -> Result<Box<dyn Node>, PersistError> {
                let state: LiteralState<$ty> = serde_json::from_value(record.state.clone())?;
                Ok(Box::new(Self {
                    id: record.node_id,
                    position: record.position,
                    output: state.output,
                    value: state.value,
                }))
            }
        }

        impl Node for $name {
            fn type_name(&self) -> &'static str {
                $type_key
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
                let mut node = Self::with_value(self.value);
                node.position = self.position;
                node
            }

            fn layout(&self) -> Vec<PinId> {
                vec![self.output]
            }

            fn on_enter(&mut self, graph: &mut RenderGraph) {
                self.output = graph.register_pin(self.id, DataKind::$kind);
            }

            fn run(
                &mut self,
                graph: &mut RenderGraph,
                _backend: &mut dyn RenderBackend,
                _assets: &AssetStore,
            ) {
                graph.set_pin_data(self.output, Data::$kind(self.value));
            }

            fn save_state(&self) -> Result<serde_json::Value, PersistError> {
                Ok(serde_json::to_value(LiteralState {
                    output: self.output,
                    value: self.value,
                })?)
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
                self
            }
        }
    };
}

literal_node!(
    FloatNode,
    f32,
    Float,
    FLOAT_TYPE,
    0.0,
    "A user-edited Float literal."
);

literal_node!(
    Vec2Node,
    [f32; 2],
    Vec2,
    VEC2_TYPE,
    [0.0, 0.0],
    "A user-edited Vec2 literal."
);
