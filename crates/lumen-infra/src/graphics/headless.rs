// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A no-GPU backend that logs every call and always succeeds.
//!
//! Useful for demos on machines without a GL context and for exercising the
//! full submission pipeline from tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use lumen_core::math::{Extent2D, Mat4, Vec3};
use lumen_core::renderer::{
    AdapterError, GpuDevice, Mesh, MeshBufferId, ProgramId, ShaderSource, TargetId, TextureId,
    UniformLocationId,
};

/// A [`GpuDevice`] that creates nothing and draws nowhere.
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    next_id: AtomicUsize,
}

impl HeadlessDevice {
    /// Creates a headless device.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl GpuDevice for HeadlessDevice {
    fn compile_shader(&self, _source: &ShaderSource) -> Result<ProgramId, AdapterError> {
        let id = ProgramId(self.next_id());
        log::debug!("[headless] compile_shader -> {:?}", id);
        Ok(id)
    }

    fn use_program(&self, program: ProgramId) -> Result<(), AdapterError> {
        log::debug!("[headless] use_program {:?}", program);
        Ok(())
    }

    fn resolve_uniform(
        &self,
        program: ProgramId,
        name: &str,
    ) -> Result<UniformLocationId, AdapterError> {
        let id = UniformLocationId(self.next_id());
        log::debug!(
            "[headless] resolve_uniform '{}' on {:?} -> {:?}",
            name,
            program,
            id
        );
        Ok(id)
    }

    fn upload_mesh(&self, mesh: &Mesh) -> Result<MeshBufferId, AdapterError> {
        let id = MeshBufferId(self.next_id());
        log::debug!(
            "[headless] upload_mesh ({} vertices) -> {:?}",
            mesh.vertex_count(),
            id
        );
        Ok(id)
    }

    fn draw_mesh(&self, mesh: MeshBufferId) -> Result<(), AdapterError> {
        log::debug!("[headless] draw_mesh {:?}", mesh);
        Ok(())
    }

    fn allocate_image(&self, extent: Extent2D) -> Result<TextureId, AdapterError> {
        let id = TextureId(self.next_id());
        log::debug!(
            "[headless] allocate_image {}x{} -> {:?}",
            extent.width,
            extent.height,
            id
        );
        Ok(id)
    }

    fn bind_image(&self, image: TextureId, slot: u32) -> Result<(), AdapterError> {
        log::debug!("[headless] bind_image {:?} to slot {}", image, slot);
        Ok(())
    }

    fn allocate_framebuffer(
        &self,
        color_targets: &[TextureId],
        depth_stencil_target: Option<TextureId>,
    ) -> Result<TargetId, AdapterError> {
        let id = TargetId(self.next_id());
        log::debug!(
            "[headless] allocate_framebuffer ({} color, depth: {}) -> {:?}",
            color_targets.len(),
            depth_stencil_target.is_some(),
            id
        );
        Ok(id)
    }

    fn bind_framebuffer(&self, target: TargetId) -> Result<(), AdapterError> {
        log::debug!("[headless] bind_framebuffer {:?}", target);
        Ok(())
    }

    fn bind_screen_target(&self) {
        log::debug!("[headless] bind_screen_target");
    }

    fn set_uniform_f32(
        &self,
        location: UniformLocationId,
        value: f32,
    ) -> Result<(), AdapterError> {
        log::debug!("[headless] set_uniform_f32 {:?} = {}", location, value);
        Ok(())
    }

    fn set_uniform_vec3(
        &self,
        location: UniformLocationId,
        value: Vec3,
    ) -> Result<(), AdapterError> {
        log::debug!("[headless] set_uniform_vec3 {:?} = {:?}", location, value);
        Ok(())
    }

    fn set_uniform_mat4(
        &self,
        location: UniformLocationId,
        value: &Mat4,
    ) -> Result<(), AdapterError> {
        log::debug!("[headless] set_uniform_mat4 {:?} = {:?}", location, value);
        Ok(())
    }

    fn set_uniform_slot(&self, location: UniformLocationId, slot: u32) -> Result<(), AdapterError> {
        log::debug!("[headless] set_uniform_slot {:?} = {}", location, slot);
        Ok(())
    }

    fn clear(&self) {
        log::debug!("[headless] clear");
    }

    fn set_viewport(&self, extent: Extent2D) {
        log::debug!("[headless] set_viewport {}x{}", extent.width, extent.height);
    }

    fn set_line_width(&self, width: f32) {
        log::debug!("[headless] set_line_width {}", width);
    }

    fn enable_depth_test(&self) {
        log::debug!("[headless] enable_depth_test");
    }
}
