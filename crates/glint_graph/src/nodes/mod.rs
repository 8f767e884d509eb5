// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node types.

pub mod fragment;
pub mod output;
pub mod sources;
pub mod texture;
pub mod value;

pub use fragment::{FragmentNode, UniformPin};
pub use output::OutputNode;
pub use sources::{TimeNode, ViewportNode};
pub use texture::TextureNode;
pub use value::{FloatNode, ValueEdit, Vec2Node};
