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

//! Defines the declarative frame description: passes, draw commands,
//! per-draw pipeline state, and uniform sets.

use super::handle::{FramebufferId, ImageId, MeshId, ShaderId, UniformId};
use crate::expr::{MatrixExpr, ScalarExpr, VectorExpr};
use crate::math::Extent2D;
use std::collections::HashMap;

/// The vertex and fragment source pair a shader is compiled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// The vertex shader source text.
    pub vertex: String,
    /// The fragment shader source text.
    pub fragment: String,
}

impl ShaderSource {
    /// Creates a source pair from vertex and fragment text.
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// A named uniform slot on a shader, awaiting location resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBinding {
    /// The shader the uniform lives on.
    pub shader: ShaderId,
    /// The uniform's name in the shader source.
    pub name: String,
}

/// The per-draw GPU state bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    /// The shader program to draw with.
    pub shader: ShaderId,
    /// Texture-slot index to image handle. Slots are unique; their order
    /// is irrelevant.
    pub texture_slots: HashMap<u32, ImageId>,
    /// The viewport extent, also written into the variable environment's
    /// builtin slots before the draw's uniforms are evaluated.
    pub viewport: Extent2D,
}

/// A value pushed to a uniform location, either derived from an expression
/// tree or referencing a texture slot.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// A scalar expression, evaluated per draw.
    Scalar(ScalarExpr),
    /// A vector expression, evaluated per draw.
    Vector(VectorExpr),
    /// A matrix expression, evaluated per draw.
    Matrix(MatrixExpr),
    /// A texture-slot index (sampler binding).
    Image(u32),
}

/// Pairs a uniform handle with the value to push to it.
///
/// Within a draw command, sets are applied in order; if two sets target the
/// same uniform, the last write wins.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSet {
    /// The uniform to write.
    pub uniform: UniformId,
    /// The value to push.
    pub value: UniformValue,
}

impl UniformSet {
    /// Creates a uniform set.
    pub fn new(uniform: UniformId, value: UniformValue) -> Self {
        Self { uniform, value }
    }
}

/// A single mesh draw with its pipeline state and uniform writes.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// The per-draw state to apply.
    pub pipeline: Pipeline,
    /// The mesh to draw.
    pub mesh: MeshId,
    /// The uniform writes to apply before drawing, in order.
    pub uniforms: Vec<UniformSet>,
}

/// An ordered batch of draws targeting one framebuffer.
///
/// Passes execute strictly in submission order. Draws inside a pass are
/// regrouped by shader to elide redundant program binds, which must not
/// change any draw's observable effect.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass {
    /// The target framebuffer; [`FramebufferId::DEFAULT`] is the screen.
    pub framebuffer: FramebufferId,
    /// The draw commands, in submission order.
    pub draws: Vec<DrawCommand>,
}
