// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pin definitions - the typed ports nodes exchange data through.

use crate::data::{Data, DataKind};
use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// Unique identifier for a pin within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PinId(pub u64);

impl std::fmt::Display for PinId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pin#{}", self.0)
    }
}

/// A typed port on a node, holding the value currently flowing through it.
///
/// A pin does not know whether it is an input or an output; that role is
/// implied by how edges reference it. Pins are created exclusively through
/// [`crate::RenderGraph::register_pin`] by the node that owns them and
/// destroyed by the graph when the node is removed or retires the port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    /// Graph-unique pin id
    pub id: PinId,
    /// The node that registered this pin
    pub node: NodeId,
    /// Registration type tag (what the port is declared to carry)
    pub kind: DataKind,
    /// The value currently on the pin; cleared between frames
    pub data: Data,
}

impl Pin {
    /// Create a pin with an empty value of the given kind tag.
    pub fn new(id: PinId, node: NodeId, kind: DataKind) -> Self {
        Self {
            id,
            node,
            kind,
            data: Data::Empty,
        }
    }
}
