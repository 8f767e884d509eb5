// SPDX-License-Identifier: MIT OR Apache-2.0
//! Asset identity and lookup for the Glint render graph.
//!
//! The graph engine never owns shader sources, texture images, or geometry
//! buffers. It holds [`AssetId`]s and resolves them on demand through an
//! [`AssetStore`] owned by the host. An unknown id is an ordinary miss
//! (`None`), never an error.

pub mod store;

pub use store::{AssetStore, GeometryAsset, ShaderAsset, TextureAsset};

use serde::{Deserialize, Serialize};

/// Unique identifier for an asset (shader, texture, or geometry).
///
/// Ids are allocated monotonically per store and are never reused within
/// one store's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

/// Opaque handle to a GPU texture.
///
/// Produced by the backend when an image is uploaded or a render target is
/// resolved; the engine only moves it between pins and never inspects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u64);

impl std::fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tex#{}", self.0)
    }
}
