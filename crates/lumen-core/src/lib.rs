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

//! # Lumen Core
//!
//! The backend-agnostic heart of the Lumen rendering layer: math types,
//! lazy uniform expressions, procedural shapes, and the declarative
//! renderer itself. Everything GPU-specific hides behind the
//! [`renderer::GpuDevice`] trait; concrete backends live in `lumen-infra`.

#![warn(missing_docs)]

pub mod expr;
pub mod math;
pub mod renderer;
pub mod shapes;

pub use expr::{EvalError, MatrixExpr, ScalarExpr, VarEnv, VectorExpr};
pub use math::{Extent2D, Mat4, Vec3, Vec4};
pub use renderer::{GpuDevice, RenderError, Renderer};
