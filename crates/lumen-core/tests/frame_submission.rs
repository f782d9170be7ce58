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

//! End-to-end tests of the renderer facade against a recording backend.
//!
//! The recording device captures every backend call in order, so the tests
//! can assert on the exact command stream a frame produces.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use lumen_core::expr::{MatrixExpr, ScalarExpr, VarEnv, VectorExpr};
use lumen_core::math::{Extent2D, Mat4, Vec3};
use lumen_core::renderer::{
    AdapterError, DrawCommand, FramebufferId, GpuDevice, IndexTriangle, Mesh, MeshBufferId,
    MeshId, Pipeline, ProgramId, RenderError, RenderPass, Renderer, ResourceKind, ShaderSource,
    TargetId, TextureId, UniformLocationId, UniformSet, UniformValue,
};
use lumen_core::shapes::generate_icosphere;

// ─── Recording backend ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Event {
    CompileShader,
    UseProgram(ProgramId),
    ResolveUniform(ProgramId, String),
    UploadMesh,
    DrawMesh(MeshBufferId),
    AllocateImage(Extent2D),
    BindImage(TextureId, u32),
    AllocateFramebuffer(usize, bool),
    BindFramebuffer(TargetId),
    BindScreenTarget,
    SetF32(UniformLocationId, f32),
    SetVec3(UniformLocationId, Vec3),
    SetMat4(UniformLocationId, Mat4),
    SetSlot(UniformLocationId, u32),
    Clear,
    SetViewport(Extent2D),
    SetLineWidth(f32),
    EnableDepthTest,
}

/// Records every call and hands out sequential backend ids.
///
/// Setting `failing_compile` makes the n-th `compile_shader` call fail
/// with the given diagnostic, like a shader with a syntax error would.
#[derive(Default)]
struct RecordingDevice {
    events: Arc<Mutex<Vec<Event>>>,
    next_id: AtomicUsize,
    compile_calls: AtomicUsize,
    failing_compile: Option<(usize, String)>,
}

impl RecordingDevice {
    fn new() -> (Self, Arc<Mutex<Vec<Event>>>) {
        let device = Self::default();
        let events = device.events.clone();
        (device, events)
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn next(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl GpuDevice for RecordingDevice {
    fn compile_shader(&self, _source: &ShaderSource) -> Result<ProgramId, AdapterError> {
        let call = self.compile_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((fail_at, diagnostic)) = &self.failing_compile {
            if call == *fail_at {
                return Err(AdapterError::new(diagnostic.clone()));
            }
        }
        self.record(Event::CompileShader);
        Ok(ProgramId(self.next()))
    }

    fn use_program(&self, program: ProgramId) -> Result<(), AdapterError> {
        self.record(Event::UseProgram(program));
        Ok(())
    }

    fn resolve_uniform(
        &self,
        program: ProgramId,
        name: &str,
    ) -> Result<UniformLocationId, AdapterError> {
        self.record(Event::ResolveUniform(program, name.to_string()));
        Ok(UniformLocationId(self.next()))
    }

    fn upload_mesh(&self, _mesh: &Mesh) -> Result<MeshBufferId, AdapterError> {
        self.record(Event::UploadMesh);
        Ok(MeshBufferId(self.next()))
    }

    fn draw_mesh(&self, mesh: MeshBufferId) -> Result<(), AdapterError> {
        self.record(Event::DrawMesh(mesh));
        Ok(())
    }

    fn allocate_image(&self, extent: Extent2D) -> Result<TextureId, AdapterError> {
        self.record(Event::AllocateImage(extent));
        Ok(TextureId(self.next()))
    }

    fn bind_image(&self, image: TextureId, slot: u32) -> Result<(), AdapterError> {
        self.record(Event::BindImage(image, slot));
        Ok(())
    }

    fn allocate_framebuffer(
        &self,
        color_targets: &[TextureId],
        depth_stencil_target: Option<TextureId>,
    ) -> Result<TargetId, AdapterError> {
        self.record(Event::AllocateFramebuffer(
            color_targets.len(),
            depth_stencil_target.is_some(),
        ));
        Ok(TargetId(self.next()))
    }

    fn bind_framebuffer(&self, target: TargetId) -> Result<(), AdapterError> {
        self.record(Event::BindFramebuffer(target));
        Ok(())
    }

    fn bind_screen_target(&self) {
        self.record(Event::BindScreenTarget);
    }

    fn set_uniform_f32(
        &self,
        location: UniformLocationId,
        value: f32,
    ) -> Result<(), AdapterError> {
        self.record(Event::SetF32(location, value));
        Ok(())
    }

    fn set_uniform_vec3(
        &self,
        location: UniformLocationId,
        value: Vec3,
    ) -> Result<(), AdapterError> {
        self.record(Event::SetVec3(location, value));
        Ok(())
    }

    fn set_uniform_mat4(
        &self,
        location: UniformLocationId,
        value: &Mat4,
    ) -> Result<(), AdapterError> {
        self.record(Event::SetMat4(location, *value));
        Ok(())
    }

    fn set_uniform_slot(&self, location: UniformLocationId, slot: u32) -> Result<(), AdapterError> {
        self.record(Event::SetSlot(location, slot));
        Ok(())
    }

    fn clear(&self) {
        self.record(Event::Clear);
    }

    fn set_viewport(&self, extent: Extent2D) {
        self.record(Event::SetViewport(extent));
    }

    fn set_line_width(&self, width: f32) {
        self.record(Event::SetLineWidth(width));
    }

    fn enable_depth_test(&self) {
        self.record(Event::EnableDepthTest);
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn triangle_mesh() -> Mesh {
    Mesh::IndexedTriangles {
        vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        triangles: vec![IndexTriangle::new(0, 1, 2)],
    }
}

fn shader_source() -> ShaderSource {
    ShaderSource::new("void main() {}", "void main() {}")
}

fn plain_pipeline(shader: lumen_core::renderer::ShaderId) -> Pipeline {
    Pipeline {
        shader,
        texture_slots: HashMap::new(),
        viewport: Extent2D::new(800, 600),
    }
}

fn plain_draw(shader: lumen_core::renderer::ShaderId, mesh: MeshId) -> DrawCommand {
    DrawCommand {
        pipeline: plain_pipeline(shader),
        mesh,
        uniforms: Vec::new(),
    }
}

/// Extracts the subsequence of program binds and draws from an event log.
fn binds_and_draws(events: &[Event]) -> Vec<Event> {
    events
        .iter()
        .filter(|e| matches!(e, Event::UseProgram(_) | Event::DrawMesh(_)))
        .cloned()
        .collect()
}

// ─── Allocation and realization ─────────────────────────────────────────────

#[test]
fn test_allocation_is_deferred_until_draw_frame() {
    let (device, events) = RecordingDevice::new();
    let renderer = Renderer::new(Box::new(device));

    renderer.new_shader(shader_source());
    renderer.new_mesh(triangle_mesh());
    assert!(
        events.lock().unwrap().is_empty(),
        "allocation must not touch the backend"
    );

    renderer.draw_frame(&[]).unwrap();
    let log = events.lock().unwrap();
    assert!(log.contains(&Event::CompileShader));
    assert!(log.contains(&Event::UploadMesh));
}

#[test]
fn test_lookup_resolves_only_after_draw_frame() {
    let renderer = Renderer::new(Box::new(RecordingDevice::default()));
    let mesh = renderer.new_mesh(triangle_mesh());

    assert_eq!(
        renderer.lookup_mesh(mesh),
        Err(RenderError::MissingResource {
            kind: ResourceKind::Mesh,
            index: mesh.0,
        })
    );
    renderer.draw_frame(&[]).unwrap();
    assert!(renderer.lookup_mesh(mesh).is_ok());
}

#[test]
fn test_handles_are_unique_across_threads() {
    let renderer = Arc::new(Renderer::new(Box::new(RecordingDevice::default())));
    let mut join_handles = Vec::new();
    for _ in 0..8 {
        let renderer = renderer.clone();
        join_handles.push(thread::spawn(move || {
            (0..100)
                .map(|_| renderer.new_mesh(triangle_mesh()))
                .collect::<Vec<_>>()
        }));
    }
    let mut all: Vec<MeshId> = join_handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 800, "every allocation must get a fresh handle");
}

#[test]
fn test_uniform_binding_resolves_same_frame_shader() {
    let (device, events) = RecordingDevice::new();
    let renderer = Renderer::new(Box::new(device));

    let shader = renderer.new_shader(shader_source());
    renderer.new_uniform(shader, "mvp");
    renderer.draw_frame(&[]).unwrap();

    let log = events.lock().unwrap();
    let resolve = log
        .iter()
        .find(|e| matches!(e, Event::ResolveUniform(_, _)))
        .expect("uniform must be resolved during realization");
    assert_eq!(resolve, &Event::ResolveUniform(ProgramId(0), "mvp".into()));
}

#[test]
fn test_framebuffer_realizes_with_attachments() {
    let (device, events) = RecordingDevice::new();
    let renderer = Renderer::new(Box::new(device));

    let color = renderer.new_image(Extent2D::new(256, 256));
    let depth = renderer.new_image(Extent2D::new(256, 256));
    let fb = renderer.new_framebuffer(vec![color], Some(depth));
    assert_ne!(fb, FramebufferId::DEFAULT);

    renderer.draw_frame(&[]).unwrap();
    let log = events.lock().unwrap();
    assert!(log.contains(&Event::AllocateFramebuffer(1, true)));
}

#[test]
fn test_resources_realize_only_once() {
    let (device, events) = RecordingDevice::new();
    let renderer = Renderer::new(Box::new(device));

    renderer.new_shader(shader_source());
    renderer.draw_frame(&[]).unwrap();
    renderer.draw_frame(&[]).unwrap();

    let log = events.lock().unwrap();
    let compiles = log.iter().filter(|e| **e == Event::CompileShader).count();
    assert_eq!(compiles, 1, "realization must not repeat across frames");
}

// ─── Frame execution ────────────────────────────────────────────────────────

#[test]
fn test_single_draw_produces_one_bind_and_one_draw() {
    let (device, events) = RecordingDevice::new();
    let renderer = Renderer::new(Box::new(device));

    let shader = renderer.new_shader(shader_source());
    let mesh = renderer.new_mesh(triangle_mesh());
    let uniform = renderer.new_uniform(shader, "mvp");

    renderer
        .draw_frame(&[RenderPass {
            framebuffer: FramebufferId::DEFAULT,
            draws: vec![DrawCommand {
                pipeline: plain_pipeline(shader),
                mesh,
                uniforms: vec![UniformSet::new(
                    uniform,
                    UniformValue::Matrix(MatrixExpr::from(Mat4::IDENTITY)),
                )],
            }],
        }])
        .unwrap();

    let log = events.lock().unwrap();
    let execution: Vec<_> = log
        .iter()
        .skip_while(|e| !matches!(e, Event::BindScreenTarget))
        .cloned()
        .collect();
    assert_eq!(execution[0], Event::BindScreenTarget);
    assert_eq!(execution[1], Event::Clear);
    assert_eq!(
        execution
            .iter()
            .filter(|e| matches!(e, Event::UseProgram(_)))
            .count(),
        1
    );
    assert!(execution.contains(&Event::SetMat4(UniformLocationId(2), Mat4::IDENTITY)));
    assert!(matches!(execution.last(), Some(Event::DrawMesh(_))));
}

#[test]
fn test_draws_regroup_by_shader_preserving_first_appearance_order() {
    let (device, events) = RecordingDevice::new();
    let renderer = Renderer::new(Box::new(device));

    let s1 = renderer.new_shader(shader_source());
    let s2 = renderer.new_shader(shader_source());
    let (a, b, c) = (
        renderer.new_mesh(triangle_mesh()),
        renderer.new_mesh(triangle_mesh()),
        renderer.new_mesh(triangle_mesh()),
    );

    // Interleaved submission [A(s1), B(s2), C(s1)] must execute as
    // s1: A, C then s2: B.
    renderer
        .draw_frame(&[RenderPass {
            framebuffer: FramebufferId::DEFAULT,
            draws: vec![plain_draw(s1, a), plain_draw(s2, b), plain_draw(s1, c)],
        }])
        .unwrap();

    let log = events.lock().unwrap();
    // Backend ids: programs 0 and 1, then mesh buffers 2, 3, 4.
    assert_eq!(
        binds_and_draws(&log),
        vec![
            Event::UseProgram(ProgramId(0)),
            Event::DrawMesh(MeshBufferId(2)),
            Event::DrawMesh(MeshBufferId(4)),
            Event::UseProgram(ProgramId(1)),
            Event::DrawMesh(MeshBufferId(3)),
        ]
    );
}

#[test]
fn test_batching_keeps_per_draw_state() {
    let (device, events) = RecordingDevice::new();
    let renderer = Renderer::new(Box::new(device));

    let shader = renderer.new_shader(shader_source());
    let mesh = renderer.new_mesh(triangle_mesh());

    let mut small = plain_draw(shader, mesh);
    small.pipeline.viewport = Extent2D::new(100, 100);
    let mut large = plain_draw(shader, mesh);
    large.pipeline.viewport = Extent2D::new(1920, 1080);

    renderer
        .draw_frame(&[RenderPass {
            framebuffer: FramebufferId::DEFAULT,
            draws: vec![small, large],
        }])
        .unwrap();

    let log = events.lock().unwrap();
    let viewports: Vec<_> = log
        .iter()
        .filter_map(|e| match e {
            Event::SetViewport(extent) => Some(*extent),
            _ => None,
        })
        .collect();
    assert_eq!(
        viewports,
        vec![Extent2D::new(100, 100), Extent2D::new(1920, 1080)],
        "viewport must be applied per draw even within one shader group"
    );
}

#[test]
fn test_passes_execute_in_submission_order() {
    let (device, events) = RecordingDevice::new();
    let renderer = Renderer::new(Box::new(device));

    let color = renderer.new_image(Extent2D::new(64, 64));
    let fb = renderer.new_framebuffer(vec![color], None);

    renderer
        .draw_frame(&[
            RenderPass {
                framebuffer: fb,
                draws: vec![],
            },
            RenderPass {
                framebuffer: FramebufferId::DEFAULT,
                draws: vec![],
            },
        ])
        .unwrap();

    let log = events.lock().unwrap();
    let targets: Vec<_> = log
        .iter()
        .filter(|e| matches!(e, Event::BindFramebuffer(_) | Event::BindScreenTarget))
        .cloned()
        .collect();
    assert_eq!(targets.len(), 2);
    assert!(matches!(targets[0], Event::BindFramebuffer(_)));
    assert_eq!(targets[1], Event::BindScreenTarget);
}

#[test]
fn test_texture_slots_bind_and_sampler_uniform_writes_slot() {
    let (device, events) = RecordingDevice::new();
    let renderer = Renderer::new(Box::new(device));

    let shader = renderer.new_shader(shader_source());
    let mesh = renderer.new_mesh(triangle_mesh());
    let image = renderer.new_image(Extent2D::new(32, 32));
    let sampler = renderer.new_uniform(shader, "tex");

    let mut draw = plain_draw(shader, mesh);
    draw.pipeline.texture_slots.insert(3, image);
    draw.uniforms
        .push(UniformSet::new(sampler, UniformValue::Image(3)));

    renderer
        .draw_frame(&[RenderPass {
            framebuffer: FramebufferId::DEFAULT,
            draws: vec![draw],
        }])
        .unwrap();

    let log = events.lock().unwrap();
    assert!(log.iter().any(|e| matches!(e, Event::BindImage(_, 3))));
    assert!(log.iter().any(|e| matches!(e, Event::SetSlot(_, 3))));
}

// ─── Expression environment scoping ─────────────────────────────────────────

#[test]
fn test_builtin_slots_reflect_viewport_during_draw() {
    let (device, events) = RecordingDevice::new();
    let renderer = Renderer::new(Box::new(device));

    let shader = renderer.new_shader(shader_source());
    let mesh = renderer.new_mesh(triangle_mesh());
    let uniform = renderer.new_uniform(shader, "aspect");

    let aspect = ScalarExpr::var(VarEnv::SCREEN_WIDTH) / ScalarExpr::var(VarEnv::SCREEN_HEIGHT);
    let mut draw = plain_draw(shader, mesh);
    draw.uniforms
        .push(UniformSet::new(uniform, UniformValue::Scalar(aspect)));

    renderer
        .draw_frame(&[RenderPass {
            framebuffer: FramebufferId::DEFAULT,
            draws: vec![draw],
        }])
        .unwrap();

    let log = events.lock().unwrap();
    let written = log
        .iter()
        .find_map(|e| match e {
            Event::SetF32(_, value) => Some(*value),
            _ => None,
        })
        .expect("scalar uniform must be written");
    assert_eq!(written, 800.0 / 600.0);
}

#[test]
fn test_vector_expression_scales_per_draw() {
    let (device, events) = RecordingDevice::new();
    let renderer = Renderer::new(Box::new(device));

    let shader = renderer.new_shader(shader_source());
    let mesh = renderer.new_mesh(triangle_mesh());
    let uniform = renderer.new_uniform(shader, "offset");

    let expr = VectorExpr::from(Vec3::new(1.0, 2.0, 3.0)) * ScalarExpr::from(2.0);
    let mut draw = plain_draw(shader, mesh);
    draw.uniforms
        .push(UniformSet::new(uniform, UniformValue::Vector(expr)));

    renderer
        .draw_frame(&[RenderPass {
            framebuffer: FramebufferId::DEFAULT,
            draws: vec![draw],
        }])
        .unwrap();

    let log = events.lock().unwrap();
    assert!(log
        .iter()
        .any(|e| matches!(e, Event::SetVec3(_, v) if *v == Vec3::new(2.0, 4.0, 6.0))));
}

#[test]
fn test_duplicate_uniform_targets_last_write_wins() {
    let (device, events) = RecordingDevice::new();
    let renderer = Renderer::new(Box::new(device));

    let shader = renderer.new_shader(shader_source());
    let mesh = renderer.new_mesh(triangle_mesh());
    let uniform = renderer.new_uniform(shader, "t");

    let mut draw = plain_draw(shader, mesh);
    draw.uniforms = vec![
        UniformSet::new(uniform, UniformValue::Scalar(ScalarExpr::from(1.0))),
        UniformSet::new(uniform, UniformValue::Scalar(ScalarExpr::from(2.0))),
    ];

    renderer
        .draw_frame(&[RenderPass {
            framebuffer: FramebufferId::DEFAULT,
            draws: vec![draw],
        }])
        .unwrap();

    let log = events.lock().unwrap();
    let writes: Vec<_> = log
        .iter()
        .filter_map(|e| match e {
            Event::SetF32(location, value) => Some((*location, *value)),
            _ => None,
        })
        .collect();
    // Both sets target the same location, in submission order; the GPU
    // sees the last one at draw time.
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].0, writes[1].0);
    assert_eq!((writes[0].1, writes[1].1), (1.0, 2.0));
}

#[test]
fn test_unbound_variable_fails_the_frame() {
    let (device, events) = RecordingDevice::new();
    let renderer = Renderer::new(Box::new(device));

    let shader = renderer.new_shader(shader_source());
    let mesh = renderer.new_mesh(triangle_mesh());
    let uniform = renderer.new_uniform(shader, "t");

    let mut draw = plain_draw(shader, mesh);
    draw.uniforms.push(UniformSet::new(
        uniform,
        UniformValue::Scalar(ScalarExpr::var(99)),
    ));

    let result = renderer.draw_frame(&[RenderPass {
        framebuffer: FramebufferId::DEFAULT,
        draws: vec![draw],
    }]);
    assert_eq!(result, Err(RenderError::UnboundVariable { index: 99 }));
    assert!(
        !events.lock().unwrap().iter().any(|e| matches!(e, Event::DrawMesh(_))),
        "the failing draw must not be issued"
    );
}

// ─── Failure paths ──────────────────────────────────────────────────────────

#[test]
fn test_compile_failure_surfaces_diagnostic_and_skips_passes() {
    let (mut device, events) = RecordingDevice::new();
    device.failing_compile = Some((0, "0:3(12): error: 'normal' undeclared".to_string()));
    let renderer = Renderer::new(Box::new(device));

    let shader = renderer.new_shader(shader_source());
    let mesh = renderer.new_mesh(triangle_mesh());

    let result = renderer.draw_frame(&[RenderPass {
        framebuffer: FramebufferId::DEFAULT,
        draws: vec![plain_draw(shader, mesh)],
    }]);
    assert_eq!(
        result,
        Err(RenderError::AdapterFailure {
            detail: "0:3(12): error: 'normal' undeclared".to_string()
        }),
        "the backend diagnostic must reach the caller intact"
    );

    let log = events.lock().unwrap();
    assert!(
        !log.iter().any(|e| matches!(
            e,
            Event::BindScreenTarget | Event::Clear | Event::DrawMesh(_)
        )),
        "no pass may execute after a failed realization"
    );
}

#[test]
fn test_compile_failure_spares_resources_queued_after_it() {
    let (mut device, _events) = RecordingDevice::new();
    device.failing_compile = Some((1, "0:1(1): error: syntax error".to_string()));
    let renderer = Renderer::new(Box::new(device));

    let good_a = renderer.new_shader(shader_source());
    let broken = renderer.new_shader(shader_source());
    let good_c = renderer.new_shader(shader_source());

    assert!(matches!(
        renderer.draw_frame(&[]),
        Err(RenderError::AdapterFailure { .. })
    ));
    assert!(renderer.lookup_shader(good_a).is_ok());

    // The shader queued after the broken one was never attempted; the
    // next frame realizes it.
    renderer.draw_frame(&[]).unwrap();
    assert!(renderer.lookup_shader(good_c).is_ok());
    assert_eq!(
        renderer.lookup_shader(broken),
        Err(RenderError::MissingResource {
            kind: ResourceKind::Shader,
            index: broken.0,
        })
    );
}

#[test]
fn test_unknown_mesh_handle_aborts_before_drawing() {
    let (device, events) = RecordingDevice::new();
    let renderer = Renderer::new(Box::new(device));

    let shader = renderer.new_shader(shader_source());
    let result = renderer.draw_frame(&[RenderPass {
        framebuffer: FramebufferId::DEFAULT,
        draws: vec![plain_draw(shader, MeshId(999))],
    }]);

    assert_eq!(
        result,
        Err(RenderError::MissingResource {
            kind: ResourceKind::Mesh,
            index: 999,
        })
    );
    assert!(!events.lock().unwrap().iter().any(|e| matches!(e, Event::DrawMesh(_))));
}

#[test]
fn test_unknown_framebuffer_handle_fails_the_pass() {
    let renderer = Renderer::new(Box::new(RecordingDevice::default()));
    let result = renderer.draw_frame(&[RenderPass {
        framebuffer: FramebufferId(41),
        draws: vec![],
    }]);
    assert_eq!(
        result,
        Err(RenderError::MissingResource {
            kind: ResourceKind::Framebuffer,
            index: 41,
        })
    );
}

// ─── Icosphere through the full pipeline ────────────────────────────────────

#[test]
fn test_icosphere_draws_end_to_end() {
    let (device, events) = RecordingDevice::new();
    let renderer = Renderer::new(Box::new(device));

    let shader = renderer.new_shader(shader_source());
    let mesh = renderer.new_mesh(generate_icosphere(1));

    renderer
        .draw_frame(&[RenderPass {
            framebuffer: FramebufferId::DEFAULT,
            draws: vec![plain_draw(shader, mesh)],
        }])
        .unwrap();

    let log = events.lock().unwrap();
    assert!(log.contains(&Event::UploadMesh));
    assert!(log.iter().any(|e| matches!(e, Event::DrawMesh(_))));
}
