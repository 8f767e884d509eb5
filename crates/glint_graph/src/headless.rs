// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory backend stand-in.
//!
//! Compiles nothing and draws nothing: it hands out fake handles and records
//! every call so tests and headless hosts can observe exactly what the graph
//! asked the GPU to do. Compile failures are injected per shader.

use crate::backend::{BackendError, RenderBackend, TargetId};
use crate::data::Data;
use glint_assets::{AssetId, ShaderAsset, TextureHandle};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// A recorded uniform upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformCall {
    /// Uniform identifier
    pub name: String,
    /// Uploaded value
    pub value: Data,
}

/// A [`RenderBackend`] that runs entirely in memory.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    compiled: HashSet<AssetId>,
    failures: HashMap<AssetId, String>,
    targets: IndexMap<TargetId, TextureHandle>,
    bound: Option<TargetId>,
    active_shader: Option<AssetId>,
    next_handle: u64,
    /// Uniform uploads since construction, in call order.
    pub uniform_calls: Vec<UniformCall>,
    /// Geometries drawn since construction, in call order.
    pub draw_calls: Vec<AssetId>,
    /// Compile attempts since construction, in call order.
    pub compile_calls: Vec<AssetId>,
}

impl HeadlessBackend {
    /// Create a fresh backend with no compiled shaders or targets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future compile of `shader` fail with `message` until
    /// cleared by [`HeadlessBackend::clear_compile_failure`].
    pub fn set_compile_failure(&mut self, shader: AssetId, message: impl Into<String>) {
        self.failures.insert(shader, message.into());
        self.compiled.remove(&shader);
    }

    /// Let `shader` compile again, as if its source had been fixed.
    pub fn clear_compile_failure(&mut self, shader: AssetId) {
        self.failures.remove(&shader);
    }

    /// Drop the compiled program for `shader`, forcing recompilation.
    pub fn invalidate(&mut self, shader: AssetId) {
        self.compiled.remove(&shader);
    }

    /// The currently bound target, if any.
    pub fn bound_target(&self) -> Option<TargetId> {
        self.bound
    }

    /// The shader most recently made current.
    pub fn active_shader(&self) -> Option<AssetId> {
        self.active_shader
    }

    /// Number of live targets.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    fn alloc(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl RenderBackend for HeadlessBackend {
    fn compile(&mut self, shader: &ShaderAsset, _geometry: AssetId) -> Result<(), BackendError> {
        self.compile_calls.push(shader.id);
        if let Some(message) = self.failures.get(&shader.id) {
            return Err(BackendError::Compile(message.clone()));
        }
        self.compiled.insert(shader.id);
        Ok(())
    }

    fn is_compiled(&self, shader: AssetId) -> bool {
        self.compiled.contains(&shader)
    }

    fn use_shader(&mut self, shader: AssetId) {
        self.active_shader = Some(shader);
    }

    fn create_target(&mut self) -> Result<TargetId, BackendError> {
        let target = TargetId(self.alloc());
        let texture = TextureHandle(self.alloc());
        self.targets.insert(target, texture);
        Ok(target)
    }

    fn destroy_target(&mut self, target: TargetId) {
        self.targets.shift_remove(&target);
        if self.bound == Some(target) {
            self.bound = None;
        }
    }

    fn bind_output(
        &mut self,
        target: TargetId,
        _width: u32,
        _height: u32,
    ) -> Result<(), BackendError> {
        if !self.targets.contains_key(&target) {
            return Err(BackendError::TargetIncomplete(format!(
                "{target} does not exist"
            )));
        }
        self.bound = Some(target);
        Ok(())
    }

    fn set_uniform(&mut self, name: &str, value: &Data) {
        self.uniform_calls.push(UniformCall {
            name: name.to_owned(),
            value: value.clone(),
        });
    }

    fn draw(&mut self, geometry: AssetId) {
        self.draw_calls.push(geometry);
    }

    fn target_texture(&self, target: TargetId) -> Option<TextureHandle> {
        self.targets.get(&target).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shader(id: u64) -> ShaderAsset {
        ShaderAsset {
            id: AssetId(id),
            name: "test".to_owned(),
            source: String::new(),
        }
    }

    #[test]
    fn test_compile_failure_injection_and_recovery() {
        let mut backend = HeadlessBackend::new();
        backend.set_compile_failure(AssetId(1), "syntax error");

        assert!(backend.compile(&shader(1), AssetId(0)).is_err());
        assert!(!backend.is_compiled(AssetId(1)));

        backend.clear_compile_failure(AssetId(1));
        assert!(backend.compile(&shader(1), AssetId(0)).is_ok());
        assert!(backend.is_compiled(AssetId(1)));
    }

    #[test]
    fn test_destroyed_target_unbinds_and_loses_texture() {
        let mut backend = HeadlessBackend::new();
        let target = backend.create_target().unwrap();
        backend.bind_output(target, 64, 64).unwrap();
        assert_eq!(backend.bound_target(), Some(target));

        backend.destroy_target(target);
        assert_eq!(backend.bound_target(), None);
        assert!(backend.target_texture(target).is_none());
        assert!(backend.bind_output(target, 64, 64).is_err());
    }
}
