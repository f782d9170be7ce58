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

//! The renderer facade: allocation entry points and frame submission.
//!
//! All methods take `&self`, so a `Renderer` can sit behind an `Arc` and
//! accept allocation calls from any thread while one thread (the render
//! thread) calls [`Renderer::draw_frame`].

use std::collections::HashMap;
use std::sync::Mutex;

use super::device::{
    GpuDevice, MeshBufferId, ProgramId, TargetId, TextureId, UniformLocationId,
};
use super::error::RenderError;
use super::frame::{DrawCommand, RenderPass, ShaderSource, UniformBinding, UniformValue};
use super::handle::{FramebufferId, ImageId, MeshId, ShaderId, UniformId};
use super::mesh::Mesh;
use super::registry::{FramebufferSpec, RealizedTables, ResourceRegistry};
use crate::expr::{ScalarExpr, VarEnv};
use crate::math::Extent2D;

/// The rasterized width of line-list meshes, in pixels.
const LINE_WIDTH: f32 = 4.0;

/// The declarative rendering front end.
///
/// Resource allocation returns opaque handles immediately; the GPU objects
/// behind them are created lazily at the start of the next
/// [`draw_frame`](Renderer::draw_frame). A handle is valid in frame
/// descriptions as soon as it is returned, including in the same frame that
/// realizes it.
pub struct Renderer {
    device: Box<dyn GpuDevice>,
    registry: ResourceRegistry,
    env: Mutex<VarEnv>,
}

impl Renderer {
    /// Creates a renderer over a graphics backend.
    pub fn new(device: Box<dyn GpuDevice>) -> Self {
        log::info!("Renderer initialized");
        Self {
            device,
            registry: ResourceRegistry::new(),
            env: Mutex::new(VarEnv::new()),
        }
    }

    /// Registers a shader for compilation from a vertex/fragment source
    /// pair. Returns its handle immediately.
    pub fn new_shader(&self, source: ShaderSource) -> ShaderId {
        self.registry.queue_shader(source)
    }

    /// Registers mesh geometry for upload. Returns its handle immediately.
    pub fn new_mesh(&self, mesh: Mesh) -> MeshId {
        self.registry.queue_mesh(mesh)
    }

    /// Registers a named uniform on a shader for location resolution.
    /// Returns its handle immediately.
    ///
    /// The shader handle may itself still be pending; it only has to be
    /// realized by the time this binding is, within the same frame or
    /// earlier.
    pub fn new_uniform(&self, shader: ShaderId, name: impl Into<String>) -> UniformId {
        self.registry.queue_uniform(UniformBinding {
            shader,
            name: name.into(),
        })
    }

    /// Registers an uninitialized RGBA image of the given extent. Returns
    /// its handle immediately.
    pub fn new_image(&self, extent: Extent2D) -> ImageId {
        self.registry.queue_image(extent)
    }

    /// Registers a framebuffer from ordered color attachments and an
    /// optional depth/stencil attachment. Returns its handle immediately.
    ///
    /// Never returns [`FramebufferId::DEFAULT`]; that handle is reserved
    /// for the screen.
    pub fn new_framebuffer(
        &self,
        color_targets: Vec<ImageId>,
        depth_stencil_target: Option<ImageId>,
    ) -> FramebufferId {
        self.registry.queue_framebuffer(FramebufferSpec {
            color_targets,
            depth_stencil_target,
        })
    }

    /// Resolves a shader handle to its backend program id.
    ///
    /// Fails with [`RenderError::MissingResource`] until a `draw_frame`
    /// call has realized the handle.
    pub fn lookup_shader(&self, id: ShaderId) -> Result<ProgramId, RenderError> {
        self.registry.realized().shader(id)
    }

    /// Resolves a mesh handle to its backend buffer id.
    pub fn lookup_mesh(&self, id: MeshId) -> Result<MeshBufferId, RenderError> {
        self.registry.realized().mesh(id)
    }

    /// Resolves a uniform handle to its backend location id.
    pub fn lookup_uniform(&self, id: UniformId) -> Result<UniformLocationId, RenderError> {
        self.registry.realized().uniform(id)
    }

    /// Resolves an image handle to its backend texture id.
    pub fn lookup_image(&self, id: ImageId) -> Result<TextureId, RenderError> {
        self.registry.realized().image(id)
    }

    /// Resolves a framebuffer handle to its backend target id.
    pub fn lookup_framebuffer(&self, id: FramebufferId) -> Result<TargetId, RenderError> {
        self.registry.realized().framebuffer(id)
    }

    /// Writes a scalar into a variable environment slot.
    ///
    /// The builtin slots [`VarEnv::SCREEN_WIDTH`] and
    /// [`VarEnv::SCREEN_HEIGHT`] are overwritten per draw during frame
    /// execution; writing them here only affects evaluation through
    /// [`eval`](Renderer::eval).
    pub fn set_var(&self, index: usize, value: f32) {
        self.lock_env().set(index, value);
    }

    /// Evaluates a scalar expression against the current environment,
    /// outside any frame.
    pub fn eval(&self, expr: &ScalarExpr) -> Result<f32, RenderError> {
        Ok(expr.eval(&self.lock_env())?)
    }

    /// Realizes pending resources, then executes the given passes in order.
    ///
    /// Any failure aborts the frame at the failing step; already-issued
    /// backend commands for this frame are not rolled back.
    pub fn draw_frame(&self, passes: &[RenderPass]) -> Result<(), RenderError> {
        self.registry.realize_pending(self.device.as_ref())?;
        let realized = self.registry.realized();
        let mut env = self.lock_env();
        log::debug!("Drawing frame with {} pass(es)", passes.len());
        for pass in passes {
            self.execute_pass(&realized, &mut env, pass)?;
        }
        Ok(())
    }

    fn lock_env(&self) -> std::sync::MutexGuard<'_, VarEnv> {
        self.env.lock().expect("variable environment mutex poisoned")
    }

    fn execute_pass(
        &self,
        realized: &RealizedTables,
        env: &mut VarEnv,
        pass: &RenderPass,
    ) -> Result<(), RenderError> {
        let device = self.device.as_ref();
        if pass.framebuffer == FramebufferId::DEFAULT {
            device.bind_screen_target();
        } else {
            device.bind_framebuffer(realized.framebuffer(pass.framebuffer)?)?;
        }
        device.clear();

        // Regroup draws by shader, keeping each shader's first-appearance
        // position and the relative order of draws within a group. Only the
        // program bind is hoisted; all other state stays per draw.
        let mut order: Vec<ShaderId> = Vec::new();
        let mut groups: HashMap<ShaderId, Vec<&DrawCommand>> = HashMap::new();
        for draw in &pass.draws {
            groups
                .entry(draw.pipeline.shader)
                .or_insert_with(|| {
                    order.push(draw.pipeline.shader);
                    Vec::new()
                })
                .push(draw);
        }
        for shader in order {
            device.use_program(realized.shader(shader)?)?;
            for &draw in &groups[&shader] {
                self.execute_draw(realized, env, draw)?;
            }
        }
        Ok(())
    }

    fn execute_draw(
        &self,
        realized: &RealizedTables,
        env: &mut VarEnv,
        draw: &DrawCommand,
    ) -> Result<(), RenderError> {
        let device = self.device.as_ref();
        let pipeline = &draw.pipeline;

        device.set_viewport(pipeline.viewport);
        device.set_line_width(LINE_WIDTH);
        device.enable_depth_test();
        for (&slot, &image) in &pipeline.texture_slots {
            device.bind_image(realized.image(image)?, slot)?;
        }

        env.set(VarEnv::SCREEN_WIDTH, pipeline.viewport.width as f32);
        env.set(VarEnv::SCREEN_HEIGHT, pipeline.viewport.height as f32);

        for set in &draw.uniforms {
            let location = realized.uniform(set.uniform)?;
            match &set.value {
                UniformValue::Scalar(expr) => device.set_uniform_f32(location, expr.eval(env)?)?,
                UniformValue::Vector(expr) => device.set_uniform_vec3(location, expr.eval(env)?)?,
                UniformValue::Matrix(expr) => device.set_uniform_mat4(location, &expr.eval(env)?)?,
                UniformValue::Image(slot) => device.set_uniform_slot(location, *slot)?,
            }
        }

        device.draw_mesh(realized.mesh(draw.mesh)?)
            .map_err(RenderError::from)
    }
}
