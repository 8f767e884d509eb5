// SPDX-License-Identifier: MIT OR Apache-2.0
//! Name-keyed node factory registry.
//!
//! Built once at startup and passed by reference to whatever needs it; there
//! is no global factory table.

use crate::node::{Node, NodeRecord};
use crate::nodes;
use crate::persist::PersistError;
use indexmap::IndexMap;

/// Constructor reconstructing a node from its persisted record.
pub type NodeConstructor = fn(&NodeRecord) -> Result<Box<dyn Node>, PersistError>;

/// Registry of node type constructors, keyed by type name.
pub struct NodeRegistry {
    constructors: IndexMap<String, NodeConstructor>,
}

impl NodeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            constructors: IndexMap::new(),
        }
    }

    /// Register a constructor under a type name. Registering the same name
    /// twice replaces the earlier constructor.
    pub fn register(&mut self, type_name: impl Into<String>, constructor: NodeConstructor) {
        self.constructors.insert(type_name.into(), constructor);
    }

    /// Whether a type name is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Iterate registered type names in registration order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Reconstruct a node from its persisted record.
    pub fn construct(&self, record: &NodeRecord) -> Result<Box<dyn Node>, PersistError> {
        let constructor = self
            .constructors
            .get(&record.node_type)
            .ok_or_else(|| PersistError::UnknownNodeType(record.node_type.clone()))?;
        constructor(record)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a registry with every built-in node type registered.
pub fn builtin_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register(nodes::output::OUTPUT_TYPE, nodes::output::OutputNode::from_record);
    registry.register(nodes::sources::TIME_TYPE, nodes::sources::TimeNode::from_record);
    registry.register(
        nodes::sources::VIEWPORT_TYPE,
        nodes::sources::ViewportNode::from_record,
    );
    registry.register(nodes::value::FLOAT_TYPE, nodes::value::FloatNode::from_record);
    registry.register(nodes::value::VEC2_TYPE, nodes::value::Vec2Node::from_record);
    registry.register(nodes::texture::TEXTURE_TYPE, nodes::texture::TextureNode::from_record);
    registry.register(
        nodes::fragment::FRAGMENT_TYPE,
        nodes::fragment::FragmentNode::from_record,
    );
    registry
}
