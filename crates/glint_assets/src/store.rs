// SPDX-License-Identifier: MIT OR Apache-2.0
//! Id-keyed asset tables.

use crate::{AssetId, TextureHandle};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A fragment shader asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderAsset {
    /// Asset id
    pub id: AssetId,
    /// Display name
    pub name: String,
    /// Fragment shader source text
    pub source: String,
}

/// A texture asset already resident on the GPU.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureAsset {
    /// Asset id
    pub id: AssetId,
    /// Display name
    pub name: String,
    /// Backend handle for the uploaded image
    pub handle: TextureHandle,
}

/// A geometry asset (vertex data the backend can draw).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryAsset {
    /// Asset id
    pub id: AssetId,
    /// Display name
    pub name: String,
}

/// The asset manager the graph collaborates with.
///
/// Three flat id-keyed tables with a shared monotonic id counter. Lookups on
/// an unknown id return `None`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AssetStore {
    shaders: IndexMap<AssetId, ShaderAsset>,
    textures: IndexMap<AssetId, TextureAsset>,
    geometries: IndexMap<AssetId, GeometryAsset>,
    next_id: u64,
}

impl AssetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> AssetId {
        let id = AssetId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a shader and return its id.
    pub fn add_shader(&mut self, name: impl Into<String>, source: impl Into<String>) -> AssetId {
        let id = self.alloc_id();
        self.shaders.insert(
            id,
            ShaderAsset {
                id,
                name: name.into(),
                source: source.into(),
            },
        );
        id
    }

    /// Add a texture and return its id.
    pub fn add_texture(&mut self, name: impl Into<String>, handle: TextureHandle) -> AssetId {
        let id = self.alloc_id();
        self.textures.insert(
            id,
            TextureAsset {
                id,
                name: name.into(),
                handle,
            },
        );
        id
    }

    /// Add a geometry and return its id.
    pub fn add_geometry(&mut self, name: impl Into<String>) -> AssetId {
        let id = self.alloc_id();
        self.geometries.insert(
            id,
            GeometryAsset {
                id,
                name: name.into(),
            },
        );
        id
    }

    /// Look up a shader by id.
    pub fn shader(&self, id: AssetId) -> Option<&ShaderAsset> {
        self.shaders.get(&id)
    }

    /// Look up a shader mutably, e.g. to edit its source.
    pub fn shader_mut(&mut self, id: AssetId) -> Option<&mut ShaderAsset> {
        self.shaders.get_mut(&id)
    }

    /// Look up a texture by id.
    pub fn texture(&self, id: AssetId) -> Option<&TextureAsset> {
        self.textures.get(&id)
    }

    /// Look up a geometry by id.
    pub fn geometry(&self, id: AssetId) -> Option<&GeometryAsset> {
        self.geometries.get(&id)
    }

    /// Remove a shader.
    pub fn remove_shader(&mut self, id: AssetId) -> Option<ShaderAsset> {
        self.shaders.swap_remove(&id)
    }

    /// Remove a texture.
    pub fn remove_texture(&mut self, id: AssetId) -> Option<TextureAsset> {
        self.textures.swap_remove(&id)
    }

    /// Remove a geometry.
    pub fn remove_geometry(&mut self, id: AssetId) -> Option<GeometryAsset> {
        self.geometries.swap_remove(&id)
    }

    /// Iterate all shaders.
    pub fn shaders(&self) -> impl Iterator<Item = &ShaderAsset> {
        self.shaders.values()
    }

    /// Iterate all textures.
    pub fn textures(&self) -> impl Iterator<Item = &TextureAsset> {
        self.textures.values()
    }
}
