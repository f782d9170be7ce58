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

//! Defines the boundary to the underlying graphics API.
//!
//! The frame submission pipeline drives a [`GpuDevice`] and never touches a
//! graphics API directly. Backends hand out their own opaque ids for the
//! objects they create; the registry maps public handles to these ids at
//! realization time. A concrete OpenGL backend and a headless logging
//! backend live in the `lumen-infra` crate.

use super::error::AdapterError;
use super::frame::ShaderSource;
use super::mesh::Mesh;
use crate::math::{Extent2D, Mat4, Vec3};

/// An opaque backend id for a compiled and linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub usize);

/// An opaque backend id for an uploaded mesh's buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshBufferId(pub usize);

/// An opaque backend id for an allocated texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// An opaque backend id for an allocated framebuffer target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub usize);

/// An opaque backend id for a resolved uniform location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocationId(pub usize);

/// The thin binding to the real graphics API.
///
/// Creation methods may block (shader compilation, buffer upload) and run
/// only during realization on the render thread. Binding, uniform, and draw
/// methods are fire-and-forget into the backend's command stream; a
/// `Result` on those signals an invalid backend id or a backend fault, both
/// integration errors.
pub trait GpuDevice: Send + Sync + 'static {
    /// Compiles and links a shader program from a source pair.
    ///
    /// On failure the error carries the compiler's full diagnostic text.
    fn compile_shader(&self, source: &ShaderSource) -> Result<ProgramId, AdapterError>;

    /// Makes a compiled program current.
    fn use_program(&self, program: ProgramId) -> Result<(), AdapterError>;

    /// Resolves a named uniform on a compiled program.
    fn resolve_uniform(
        &self,
        program: ProgramId,
        name: &str,
    ) -> Result<UniformLocationId, AdapterError>;

    /// Uploads mesh geometry into GPU buffers.
    fn upload_mesh(&self, mesh: &Mesh) -> Result<MeshBufferId, AdapterError>;

    /// Issues an indexed draw of a previously uploaded mesh.
    fn draw_mesh(&self, mesh: MeshBufferId) -> Result<(), AdapterError>;

    /// Allocates an uninitialized RGBA image.
    fn allocate_image(&self, extent: Extent2D) -> Result<TextureId, AdapterError>;

    /// Binds an image to a texture slot.
    fn bind_image(&self, image: TextureId, slot: u32) -> Result<(), AdapterError>;

    /// Allocates a framebuffer from ordered color attachments and an
    /// optional depth/stencil attachment.
    fn allocate_framebuffer(
        &self,
        color_targets: &[TextureId],
        depth_stencil_target: Option<TextureId>,
    ) -> Result<TargetId, AdapterError>;

    /// Makes a framebuffer the current render target.
    fn bind_framebuffer(&self, target: TargetId) -> Result<(), AdapterError>;

    /// Makes the default (screen) target current.
    fn bind_screen_target(&self);

    /// Pushes a scalar to a uniform location.
    fn set_uniform_f32(&self, location: UniformLocationId, value: f32)
        -> Result<(), AdapterError>;

    /// Pushes a vector to a uniform location.
    fn set_uniform_vec3(
        &self,
        location: UniformLocationId,
        value: Vec3,
    ) -> Result<(), AdapterError>;

    /// Pushes a matrix to a uniform location.
    fn set_uniform_mat4(
        &self,
        location: UniformLocationId,
        value: &Mat4,
    ) -> Result<(), AdapterError>;

    /// Pushes a texture-slot index to a sampler uniform location.
    fn set_uniform_slot(&self, location: UniformLocationId, slot: u32)
        -> Result<(), AdapterError>;

    /// Clears the bound target's color and depth buffers.
    fn clear(&self);

    /// Sets the viewport extent.
    fn set_viewport(&self, extent: Extent2D);

    /// Sets the rasterized line width in pixels.
    fn set_line_width(&self, width: f32);

    /// Enables depth testing.
    fn enable_depth_test(&self);
}
