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

//! The handle-indirected resource registry.
//!
//! Allocation entry points hand out fresh handles immediately and queue the
//! data needed to realize them; `realize_pending` turns every queued record
//! into a GPU-backed object at the start of a frame.
//!
//! Two mutex domains:
//! - `pending` covers the per-kind counters and queues. It is shared with
//!   producer threads and held for the whole of `realize_pending`, so
//!   realization has exclusive access relative to every allocation call.
//! - `realized` covers the handle-to-backend-id tables. Only the render
//!   thread locks it, during realization and pass execution, so pass
//!   execution never blocks producers.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::device::{GpuDevice, MeshBufferId, ProgramId, TargetId, TextureId, UniformLocationId};
use super::error::{RenderError, ResourceKind};
use super::frame::{ShaderSource, UniformBinding};
use super::handle::{FramebufferId, ImageId, MeshId, ShaderId, UniformId};
use super::mesh::Mesh;
use crate::math::Extent2D;

/// The attachments a pending framebuffer is realized from.
#[derive(Debug, Clone)]
pub(crate) struct FramebufferSpec {
    pub(crate) color_targets: Vec<ImageId>,
    pub(crate) depth_stencil_target: Option<ImageId>,
}

/// Per-kind counters plus the not-yet-realized creation requests.
#[derive(Debug)]
struct PendingQueues {
    next_shader: u32,
    next_mesh: u32,
    next_uniform: u32,
    next_image: u32,
    next_framebuffer: u32,
    shaders: Vec<(ShaderId, ShaderSource)>,
    meshes: Vec<(MeshId, Mesh)>,
    uniforms: Vec<(UniformId, UniformBinding)>,
    images: Vec<(ImageId, Extent2D)>,
    framebuffers: Vec<(FramebufferId, FramebufferSpec)>,
}

impl PendingQueues {
    fn new() -> Self {
        Self {
            next_shader: 0,
            next_mesh: 0,
            next_uniform: 0,
            next_image: 0,
            // Raw value 0 is FramebufferId::DEFAULT, the screen target.
            next_framebuffer: 1,
            shaders: Vec::new(),
            meshes: Vec::new(),
            uniforms: Vec::new(),
            images: Vec::new(),
            framebuffers: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.shaders.is_empty()
            && self.meshes.is_empty()
            && self.uniforms.is_empty()
            && self.images.is_empty()
            && self.framebuffers.is_empty()
    }
}

/// The realized-object tables, mapping public handles to backend ids.
#[derive(Debug, Default)]
pub(crate) struct RealizedTables {
    shaders: HashMap<ShaderId, ProgramId>,
    meshes: HashMap<MeshId, MeshBufferId>,
    uniforms: HashMap<UniformId, UniformLocationId>,
    images: HashMap<ImageId, TextureId>,
    framebuffers: HashMap<FramebufferId, TargetId>,
}

impl RealizedTables {
    pub(crate) fn shader(&self, id: ShaderId) -> Result<ProgramId, RenderError> {
        self.shaders
            .get(&id)
            .copied()
            .ok_or(RenderError::MissingResource {
                kind: ResourceKind::Shader,
                index: id.0,
            })
    }

    pub(crate) fn mesh(&self, id: MeshId) -> Result<MeshBufferId, RenderError> {
        self.meshes
            .get(&id)
            .copied()
            .ok_or(RenderError::MissingResource {
                kind: ResourceKind::Mesh,
                index: id.0,
            })
    }

    pub(crate) fn uniform(&self, id: UniformId) -> Result<UniformLocationId, RenderError> {
        self.uniforms
            .get(&id)
            .copied()
            .ok_or(RenderError::MissingResource {
                kind: ResourceKind::Uniform,
                index: id.0,
            })
    }

    pub(crate) fn image(&self, id: ImageId) -> Result<TextureId, RenderError> {
        self.images
            .get(&id)
            .copied()
            .ok_or(RenderError::MissingResource {
                kind: ResourceKind::Image,
                index: id.0,
            })
    }

    pub(crate) fn framebuffer(&self, id: FramebufferId) -> Result<TargetId, RenderError> {
        self.framebuffers
            .get(&id)
            .copied()
            .ok_or(RenderError::MissingResource {
                kind: ResourceKind::Framebuffer,
                index: id.0,
            })
    }
}

/// The thread-safe registry behind a `Renderer`.
#[derive(Debug)]
pub(crate) struct ResourceRegistry {
    pending: Mutex<PendingQueues>,
    realized: Mutex<RealizedTables>,
}

impl ResourceRegistry {
    pub(crate) fn new() -> Self {
        Self {
            pending: Mutex::new(PendingQueues::new()),
            realized: Mutex::new(RealizedTables::default()),
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, PendingQueues> {
        self.pending.lock().expect("pending queue mutex poisoned")
    }

    /// Locks the realized tables. Render thread only.
    pub(crate) fn realized(&self) -> MutexGuard<'_, RealizedTables> {
        self.realized.lock().expect("realized table mutex poisoned")
    }

    pub(crate) fn queue_shader(&self, source: ShaderSource) -> ShaderId {
        let mut pending = self.lock_pending();
        let id = ShaderId(pending.next_shader);
        pending.next_shader += 1;
        pending.shaders.push((id, source));
        id
    }

    pub(crate) fn queue_mesh(&self, mesh: Mesh) -> MeshId {
        let mut pending = self.lock_pending();
        let id = MeshId(pending.next_mesh);
        pending.next_mesh += 1;
        pending.meshes.push((id, mesh));
        id
    }

    pub(crate) fn queue_uniform(&self, binding: UniformBinding) -> UniformId {
        let mut pending = self.lock_pending();
        let id = UniformId(pending.next_uniform);
        pending.next_uniform += 1;
        pending.uniforms.push((id, binding));
        id
    }

    pub(crate) fn queue_image(&self, extent: Extent2D) -> ImageId {
        let mut pending = self.lock_pending();
        let id = ImageId(pending.next_image);
        pending.next_image += 1;
        pending.images.push((id, extent));
        id
    }

    pub(crate) fn queue_framebuffer(&self, spec: FramebufferSpec) -> FramebufferId {
        let mut pending = self.lock_pending();
        let id = FramebufferId(pending.next_framebuffer);
        pending.next_framebuffer += 1;
        pending.framebuffers.push((id, spec));
        id
    }

    /// Realizes one queue record-by-record.
    ///
    /// On success the queue empties. On a failure, the records realized so
    /// far and the failing one are removed; records queued after the
    /// failure stay pending, so a later frame picks them up.
    fn drain_queue<I: Copy, T>(
        queue: &mut Vec<(I, T)>,
        mut realize: impl FnMut(I, &T) -> Result<(), RenderError>,
    ) -> Result<(), RenderError> {
        let mut done = 0;
        let result = queue
            .iter()
            .try_for_each(|(id, data)| realize(*id, data).map(|()| done += 1));
        if result.is_ok() {
            queue.clear();
        } else {
            queue.drain(..=done);
        }
        result
    }

    /// Drains every pending queue into the realized tables.
    ///
    /// Realization order respects cross-kind dependencies: shaders before
    /// the uniform bindings that name them, images before the framebuffers
    /// that attach them. Within a kind, insertion order.
    ///
    /// A failure aborts realization at the failing record. That record is
    /// discarded (its handle stays unresolvable), while everything queued
    /// after it remains pending and is realized by the next call.
    ///
    /// Holds the pending lock for the duration, so allocation calls racing
    /// a frame land in the next generation.
    pub(crate) fn realize_pending(&self, device: &dyn GpuDevice) -> Result<(), RenderError> {
        let mut pending = self.lock_pending();
        if pending.is_empty() {
            return Ok(());
        }
        log::debug!(
            "Realizing pending resources: {} shader(s), {} mesh(es), {} image(s), \
             {} uniform(s), {} framebuffer(s)",
            pending.shaders.len(),
            pending.meshes.len(),
            pending.images.len(),
            pending.uniforms.len(),
            pending.framebuffers.len(),
        );
        let mut realized = self.realized();

        Self::drain_queue(&mut pending.shaders, |id, source| {
            let program = device.compile_shader(source)?;
            realized.shaders.insert(id, program);
            Ok(())
        })?;
        Self::drain_queue(&mut pending.meshes, |id, mesh| {
            let buffer = device.upload_mesh(mesh)?;
            realized.meshes.insert(id, buffer);
            Ok(())
        })?;
        Self::drain_queue(&mut pending.images, |id, extent| {
            let texture = device.allocate_image(*extent)?;
            realized.images.insert(id, texture);
            Ok(())
        })?;
        // Uniform bindings resolve against shaders realized above or in an
        // earlier frame.
        Self::drain_queue(&mut pending.uniforms, |id, binding| {
            let program = realized.shader(binding.shader)?;
            let location = device.resolve_uniform(program, &binding.name)?;
            realized.uniforms.insert(id, location);
            Ok(())
        })?;
        Self::drain_queue(&mut pending.framebuffers, |id, spec| {
            let color_targets = spec
                .color_targets
                .iter()
                .map(|&image| realized.image(image))
                .collect::<Result<Vec<_>, _>>()?;
            let depth_stencil_target = spec
                .depth_stencil_target
                .map(|image| realized.image(image))
                .transpose()?;
            let target = device.allocate_framebuffer(&color_targets, depth_stencil_target)?;
            realized.framebuffers.insert(id, target);
            Ok(())
        })
    }
}
