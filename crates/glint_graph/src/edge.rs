// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge definitions - directed connections between pins.

use crate::pin::PinId;
use serde::{Deserialize, Serialize};

/// Unique identifier for an edge within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "edge#{}", self.0)
    }
}

/// A single directed arc from a producer (output) pin to a consumer (input)
/// pin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Edge {
    /// Graph-unique edge id
    pub id: EdgeId,
    /// Producer pin
    pub from: PinId,
    /// Consumer pin
    pub to: PinId,
}

impl Edge {
    /// Create a new edge record.
    pub fn new(id: EdgeId, from: PinId, to: PinId) -> Self {
        Self { id, from, to }
    }

    /// Check whether this edge touches the given pin on either end.
    pub fn involves_pin(&self, pin: PinId) -> bool {
        self.from == pin || self.to == pin
    }
}
