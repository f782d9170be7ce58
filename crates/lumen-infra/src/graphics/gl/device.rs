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

//! OpenGL implementation of the `GpuDevice` contract, via `glow`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use glow::HasContext;
use lumen_core::math::{Extent2D, Mat4, Vec3};
use lumen_core::renderer::{
    AdapterError, GpuDevice, Mesh, MeshBufferId, ProgramId, ShaderSource, TargetId, TextureId,
    UniformLocationId,
};

/// The uploaded-mesh state a draw call needs.
struct GlMeshEntry {
    vertex_array: glow::VertexArray,
    primitive_mode: u32,
    index_count: i32,
}

/// A [`GpuDevice`] over an OpenGL (ES 3.0 or core 3.3+) context.
///
/// All methods must be called from the thread that owns the GL context;
/// the renderer's realization and pass execution already guarantee this.
pub struct GlDevice {
    gl: glow::Context,
    next_id: AtomicUsize,
    programs: Mutex<HashMap<ProgramId, glow::Program>>,
    meshes: Mutex<HashMap<MeshBufferId, GlMeshEntry>>,
    textures: Mutex<HashMap<TextureId, glow::Texture>>,
    targets: Mutex<HashMap<TargetId, glow::Framebuffer>>,
    locations: Mutex<HashMap<UniformLocationId, glow::UniformLocation>>,
}

impl GlDevice {
    /// Wraps an existing GL context.
    pub fn new(gl: glow::Context) -> Self {
        log::info!("GlDevice initialized");
        Self {
            gl,
            next_id: AtomicUsize::new(0),
            programs: Mutex::new(HashMap::new()),
            meshes: Mutex::new(HashMap::new()),
            textures: Mutex::new(HashMap::new()),
            targets: Mutex::new(HashMap::new()),
            locations: Mutex::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn lock<'a, T>(
        &self,
        table: &'a Mutex<T>,
        what: &str,
    ) -> Result<MutexGuard<'a, T>, AdapterError> {
        table
            .lock()
            .map_err(|_| AdapterError::new(format!("{what} table mutex poisoned")))
    }

    fn compile_stage(&self, stage: u32, source: &str) -> Result<glow::Shader, AdapterError> {
        unsafe {
            let shader = self.gl.create_shader(stage).map_err(AdapterError::new)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(AdapterError::new(format!(
                    "Shader compilation failed: {log}"
                )));
            }
            Ok(shader)
        }
    }
}

impl GpuDevice for GlDevice {
    fn compile_shader(&self, source: &ShaderSource) -> Result<ProgramId, AdapterError> {
        let vertex = self.compile_stage(glow::VERTEX_SHADER, &source.vertex)?;
        let fragment = self.compile_stage(glow::FRAGMENT_SHADER, &source.fragment)?;
        let program = unsafe {
            let program = self.gl.create_program().map_err(AdapterError::new)?;
            self.gl.attach_shader(program, vertex);
            self.gl.attach_shader(program, fragment);
            self.gl.link_program(program);
            self.gl.delete_shader(vertex);
            self.gl.delete_shader(fragment);
            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(AdapterError::new(format!("Program link failed: {log}")));
            }
            program
        };
        let id = ProgramId(self.next_id());
        self.lock(&self.programs, "program")?.insert(id, program);
        log::debug!("Compiled shader program {:?}", id);
        Ok(id)
    }

    fn use_program(&self, program: ProgramId) -> Result<(), AdapterError> {
        let programs = self.lock(&self.programs, "program")?;
        let native = programs
            .get(&program)
            .ok_or_else(|| AdapterError::new(format!("Unknown program id {:?}", program)))?;
        unsafe { self.gl.use_program(Some(*native)) };
        Ok(())
    }

    fn resolve_uniform(
        &self,
        program: ProgramId,
        name: &str,
    ) -> Result<UniformLocationId, AdapterError> {
        let native = {
            let programs = self.lock(&self.programs, "program")?;
            *programs
                .get(&program)
                .ok_or_else(|| AdapterError::new(format!("Unknown program id {:?}", program)))?
        };
        let location = unsafe { self.gl.get_uniform_location(native, name) }
            .ok_or_else(|| AdapterError::new(format!("Uniform '{name}' not found in program")))?;
        let id = UniformLocationId(self.next_id());
        self.lock(&self.locations, "uniform location")?
            .insert(id, location);
        log::debug!("Resolved uniform '{}' as {:?}", name, id);
        Ok(id)
    }

    fn upload_mesh(&self, mesh: &Mesh) -> Result<MeshBufferId, AdapterError> {
        let (vertices, indices, primitive_mode) = match mesh {
            Mesh::IndexedLines { vertices, lines } => {
                let indices: Vec<u32> = lines.iter().flat_map(|l| [l.a, l.b]).collect();
                (vertices, indices, glow::LINES)
            }
            Mesh::IndexedTriangles {
                vertices,
                triangles,
            } => {
                let indices: Vec<u32> =
                    triangles.iter().flat_map(|t| [t.a, t.b, t.c]).collect();
                (vertices, indices, glow::TRIANGLES)
            }
        };

        let vertex_array = unsafe {
            let vao = self.gl.create_vertex_array().map_err(AdapterError::new)?;
            self.gl.bind_vertex_array(Some(vao));

            let vbo = self.gl.create_buffer().map_err(AdapterError::new)?;
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(vertices),
                glow::STATIC_DRAW,
            );
            self.gl.vertex_attrib_pointer_f32(
                0,
                3,
                glow::FLOAT,
                false,
                3 * std::mem::size_of::<f32>() as i32,
                0,
            );
            self.gl.enable_vertex_attrib_array(0);

            let ebo = self.gl.create_buffer().map_err(AdapterError::new)?;
            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            self.gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(&indices),
                glow::STATIC_DRAW,
            );

            self.gl.bind_vertex_array(None);
            vao
        };

        let id = MeshBufferId(self.next_id());
        self.lock(&self.meshes, "mesh")?.insert(
            id,
            GlMeshEntry {
                vertex_array,
                primitive_mode,
                index_count: indices.len() as i32,
            },
        );
        log::debug!(
            "Uploaded mesh {:?} ({} vertices, {} indices)",
            id,
            vertices.len(),
            indices.len()
        );
        Ok(id)
    }

    fn draw_mesh(&self, mesh: MeshBufferId) -> Result<(), AdapterError> {
        let meshes = self.lock(&self.meshes, "mesh")?;
        let entry = meshes
            .get(&mesh)
            .ok_or_else(|| AdapterError::new(format!("Unknown mesh buffer id {:?}", mesh)))?;
        unsafe {
            self.gl.bind_vertex_array(Some(entry.vertex_array));
            self.gl.draw_elements(
                entry.primitive_mode,
                entry.index_count,
                glow::UNSIGNED_INT,
                0,
            );
            self.gl.bind_vertex_array(None);
        }
        Ok(())
    }

    fn allocate_image(&self, extent: Extent2D) -> Result<TextureId, AdapterError> {
        let texture = unsafe {
            let texture = self.gl.create_texture().map_err(AdapterError::new)?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.tex_storage_2d(
                glow::TEXTURE_2D,
                1,
                glow::RGBA8,
                extent.width as i32,
                extent.height as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::NEAREST as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::NEAREST as i32,
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
            texture
        };
        let id = TextureId(self.next_id());
        self.lock(&self.textures, "texture")?.insert(id, texture);
        log::debug!("Allocated {}x{} image {:?}", extent.width, extent.height, id);
        Ok(id)
    }

    fn bind_image(&self, image: TextureId, slot: u32) -> Result<(), AdapterError> {
        let textures = self.lock(&self.textures, "texture")?;
        let native = textures
            .get(&image)
            .ok_or_else(|| AdapterError::new(format!("Unknown texture id {:?}", image)))?;
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + slot);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(*native));
        }
        Ok(())
    }

    fn allocate_framebuffer(
        &self,
        color_targets: &[TextureId],
        depth_stencil_target: Option<TextureId>,
    ) -> Result<TargetId, AdapterError> {
        let textures = self.lock(&self.textures, "texture")?;
        let framebuffer = unsafe {
            let framebuffer = self.gl.create_framebuffer().map_err(AdapterError::new)?;
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
            let mut draw_buffers = Vec::with_capacity(color_targets.len());
            for (i, image) in color_targets.iter().enumerate() {
                let native = textures.get(image).ok_or_else(|| {
                    AdapterError::new(format!("Unknown texture id {:?}", image))
                })?;
                let attachment = glow::COLOR_ATTACHMENT0 + i as u32;
                self.gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    attachment,
                    glow::TEXTURE_2D,
                    Some(*native),
                    0,
                );
                draw_buffers.push(attachment);
            }
            if let Some(image) = depth_stencil_target {
                let native = textures.get(&image).ok_or_else(|| {
                    AdapterError::new(format!("Unknown texture id {:?}", image))
                })?;
                self.gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    glow::DEPTH_STENCIL_ATTACHMENT,
                    glow::TEXTURE_2D,
                    Some(*native),
                    0,
                );
            }
            self.gl.draw_buffers(&draw_buffers);
            let status = self.gl.check_framebuffer_status(glow::FRAMEBUFFER);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            if status != glow::FRAMEBUFFER_COMPLETE {
                self.gl.delete_framebuffer(framebuffer);
                return Err(AdapterError::new(format!(
                    "Framebuffer incomplete (status {status:#x})"
                )));
            }
            framebuffer
        };
        let id = TargetId(self.next_id());
        self.lock(&self.targets, "framebuffer")?.insert(id, framebuffer);
        log::debug!(
            "Allocated framebuffer {:?} ({} color attachment(s))",
            id,
            color_targets.len()
        );
        Ok(id)
    }

    fn bind_framebuffer(&self, target: TargetId) -> Result<(), AdapterError> {
        let targets = self.lock(&self.targets, "framebuffer")?;
        let native = targets
            .get(&target)
            .ok_or_else(|| AdapterError::new(format!("Unknown framebuffer id {:?}", target)))?;
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(*native)) };
        Ok(())
    }

    fn bind_screen_target(&self) {
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, None) };
    }

    fn set_uniform_f32(
        &self,
        location: UniformLocationId,
        value: f32,
    ) -> Result<(), AdapterError> {
        let locations = self.lock(&self.locations, "uniform location")?;
        let native = locations
            .get(&location)
            .ok_or_else(|| AdapterError::new(format!("Unknown uniform location {:?}", location)))?;
        unsafe { self.gl.uniform_1_f32(Some(native), value) };
        Ok(())
    }

    fn set_uniform_vec3(
        &self,
        location: UniformLocationId,
        value: Vec3,
    ) -> Result<(), AdapterError> {
        let locations = self.lock(&self.locations, "uniform location")?;
        let native = locations
            .get(&location)
            .ok_or_else(|| AdapterError::new(format!("Unknown uniform location {:?}", location)))?;
        unsafe { self.gl.uniform_3_f32(Some(native), value.x, value.y, value.z) };
        Ok(())
    }

    fn set_uniform_mat4(
        &self,
        location: UniformLocationId,
        value: &Mat4,
    ) -> Result<(), AdapterError> {
        let locations = self.lock(&self.locations, "uniform location")?;
        let native = locations
            .get(&location)
            .ok_or_else(|| AdapterError::new(format!("Unknown uniform location {:?}", location)))?;
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(native), false, &value.to_cols_array())
        };
        Ok(())
    }

    fn set_uniform_slot(&self, location: UniformLocationId, slot: u32) -> Result<(), AdapterError> {
        let locations = self.lock(&self.locations, "uniform location")?;
        let native = locations
            .get(&location)
            .ok_or_else(|| AdapterError::new(format!("Unknown uniform location {:?}", location)))?;
        unsafe { self.gl.uniform_1_i32(Some(native), slot as i32) };
        Ok(())
    }

    fn clear(&self) {
        unsafe {
            self.gl.clear_color(0.0, 0.0, 0.0, 1.0);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn set_viewport(&self, extent: Extent2D) {
        unsafe {
            self.gl
                .viewport(0, 0, extent.width as i32, extent.height as i32)
        };
    }

    fn set_line_width(&self, width: f32) {
        unsafe { self.gl.line_width(width) };
    }

    fn enable_depth_test(&self) {
        unsafe { self.gl.enable(glow::DEPTH_TEST) };
    }
}
