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

//! The declarative, command-buffered rendering layer.
//!
//! Callers describe frames as value types ([`RenderPass`], [`DrawCommand`])
//! referencing resources through opaque handles. The [`Renderer`] owns the
//! lifecycle: allocation hands out handles without touching the GPU, and
//! [`Renderer::draw_frame`] realizes whatever is pending before executing
//! the frame. The GPU itself sits behind the [`GpuDevice`] trait.

pub mod device;
pub mod error;
pub mod frame;
pub mod handle;
pub mod mesh;
mod registry;
pub mod submission;

pub use device::{GpuDevice, MeshBufferId, ProgramId, TargetId, TextureId, UniformLocationId};
pub use error::{AdapterError, RenderError, ResourceKind};
pub use frame::{
    DrawCommand, Pipeline, RenderPass, ShaderSource, UniformBinding, UniformSet, UniformValue,
};
pub use handle::{FramebufferId, ImageId, MeshId, ShaderId, UniformId};
pub use mesh::{IndexLine, IndexTriangle, Mesh};
pub use submission::Renderer;
