// SPDX-License-Identifier: MIT OR Apache-2.0
//! The GPU execution capability the graph calls into but does not implement.

use crate::data::Data;
use glint_assets::{AssetId, ShaderAsset, TextureHandle};
use serde::{Deserialize, Serialize};

/// Opaque handle to an offscreen render target owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u64);

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// Error reported by a backend operation.
///
/// Backend failures never escape a node's `run`: the node converts them to a
/// halted pass plus a deduplicated log entry, and the operation is retried on
/// a later frame once the underlying condition changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Shader compilation or linking failed
    #[error("shader compile failed: {0}")]
    Compile(String),

    /// Render target could not be created or completed
    #[error("render target incomplete: {0}")]
    TargetIncomplete(String),
}

/// The narrow contract between the graph and the GPU execution layer.
///
/// The engine issues these calls synchronously from `run` hooks on the
/// calling thread; a slow implementation stalls the frame.
pub trait RenderBackend {
    /// Compile `shader` for rasterization with `geometry`.
    fn compile(&mut self, shader: &ShaderAsset, geometry: AssetId) -> Result<(), BackendError>;

    /// Whether a compiled program exists for this shader.
    fn is_compiled(&self, shader: AssetId) -> bool;

    /// Make the compiled program for `shader` current.
    fn use_shader(&mut self, shader: AssetId);

    /// Create an offscreen render target.
    fn create_target(&mut self) -> Result<TargetId, BackendError>;

    /// Destroy an offscreen render target and its texture.
    fn destroy_target(&mut self, target: TargetId);

    /// Bind `target` as the draw output, (re)sizing it to `width` x `height`.
    fn bind_output(&mut self, target: TargetId, width: u32, height: u32)
        -> Result<(), BackendError>;

    /// Upload a uniform value for the current program.
    fn set_uniform(&mut self, name: &str, value: &Data);

    /// Rasterize `geometry` into the bound output.
    fn draw(&mut self, geometry: AssetId);

    /// The texture handle backing a target's color attachment.
    fn target_texture(&self, target: TargetId) -> Option<TextureHandle>;
}
