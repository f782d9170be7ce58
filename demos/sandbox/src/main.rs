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

// Lumen Sandbox
// Drives the full submission pipeline against the headless backend:
// offscreen icosphere pass, then a screen pass sampling its output.

use std::collections::HashMap;

use anyhow::Result;
use lumen_core::expr::{MatrixExpr, ScalarExpr, VarEnv, VectorExpr};
use lumen_core::math::{Extent2D, Vec3, FRAC_PI_4};
use lumen_core::renderer::{
    DrawCommand, FramebufferId, IndexTriangle, Mesh, Pipeline, RenderPass, Renderer, ShaderSource,
    UniformSet, UniformValue,
};
use lumen_core::shapes::generate_icosphere;
use lumen_infra::HeadlessDevice;

const SPHERE_VERT: &str = r#"#version 300 es
layout(location = 0) in vec3 position;
uniform mat4 projection;
uniform mat4 model;
void main() {
    gl_Position = projection * model * vec4(position, 1.0);
}
"#;

const SPHERE_FRAG: &str = r#"#version 300 es
precision mediump float;
uniform vec3 tint;
out vec4 color;
void main() {
    color = vec4(tint, 1.0);
}
"#;

const BLIT_VERT: &str = r#"#version 300 es
layout(location = 0) in vec3 position;
void main() {
    gl_Position = vec4(position, 1.0);
}
"#;

const BLIT_FRAG: &str = r#"#version 300 es
precision mediump float;
uniform sampler2D source;
out vec4 color;
void main() {
    color = texelFetch(source, ivec2(gl_FragCoord.xy), 0);
}
"#;

fn fullscreen_quad() -> Mesh {
    Mesh::IndexedTriangles {
        vertices: vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ],
        triangles: vec![IndexTriangle::new(0, 1, 2), IndexTriangle::new(0, 2, 3)],
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("debug")).init();

    let viewport = Extent2D::new(800, 600);
    let renderer = Renderer::new(Box::new(HeadlessDevice::new()));

    // Resources for the offscreen pass.
    let sphere_shader = renderer.new_shader(ShaderSource::new(SPHERE_VERT, SPHERE_FRAG));
    let sphere_mesh = renderer.new_mesh(generate_icosphere(2));
    let projection = renderer.new_uniform(sphere_shader, "projection");
    let model = renderer.new_uniform(sphere_shader, "model");
    let tint = renderer.new_uniform(sphere_shader, "tint");

    let color_target = renderer.new_image(viewport);
    let depth_target = renderer.new_image(viewport);
    let offscreen = renderer.new_framebuffer(vec![color_target], Some(depth_target));

    // Resources for the screen pass.
    let blit_shader = renderer.new_shader(ShaderSource::new(BLIT_VERT, BLIT_FRAG));
    let quad_mesh = renderer.new_mesh(fullscreen_quad());
    let source = renderer.new_uniform(blit_shader, "source");

    // The projection derives its aspect ratio from the builtin viewport
    // slots, so it follows whatever viewport each draw uses.
    let aspect = ScalarExpr::var(VarEnv::SCREEN_WIDTH) / ScalarExpr::var(VarEnv::SCREEN_HEIGHT);
    let perspective = MatrixExpr::Perspective {
        fov_y: ScalarExpr::from(FRAC_PI_4),
        aspect_ratio: aspect,
        clip_near: ScalarExpr::from(0.1),
        clip_far: ScalarExpr::from(100.0),
    };
    let pull_back = MatrixExpr::Translation(VectorExpr::from(Vec3::new(0.0, 0.0, -4.0)));

    let sphere_pass = RenderPass {
        framebuffer: offscreen,
        draws: vec![DrawCommand {
            pipeline: Pipeline {
                shader: sphere_shader,
                texture_slots: HashMap::new(),
                viewport,
            },
            mesh: sphere_mesh,
            uniforms: vec![
                UniformSet::new(projection, UniformValue::Matrix(perspective)),
                UniformSet::new(model, UniformValue::Matrix(pull_back)),
                UniformSet::new(
                    tint,
                    UniformValue::Vector(VectorExpr::from(Vec3::new(0.9, 0.4, 0.1))),
                ),
            ],
        }],
    };

    let screen_pass = RenderPass {
        framebuffer: FramebufferId::DEFAULT,
        draws: vec![DrawCommand {
            pipeline: Pipeline {
                shader: blit_shader,
                texture_slots: HashMap::from([(0, color_target)]),
                viewport,
            },
            mesh: quad_mesh,
            uniforms: vec![UniformSet::new(source, UniformValue::Image(0))],
        }],
    };

    for frame in 0..3 {
        log::info!("Submitting frame {}", frame);
        renderer.draw_frame(&[sphere_pass.clone(), screen_pass.clone()])?;
    }

    Ok(())
}
