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

//! Provides the expression trees that uniform values are derived from.
//!
//! Instead of supplying every uniform as a literal, a draw command may carry
//! a small expression tree (scalar, vector, or matrix shaped) that is
//! evaluated lazily against a [`VarEnv`] just before the draw is issued.
//! This is how a uniform can depend on the current viewport: the frame
//! pipeline writes the viewport into the environment's builtin slots before
//! evaluating that draw's uniforms.
//!
//! Trees are immutable pure values: evaluating the same tree against the
//! same environment is deterministic and side-effect free. The only error an
//! evaluation can produce is a reference to an environment slot that was
//! never populated, which is a construction-time bug rather than a runtime
//! condition.
//!
//! Every node renders canonically through [`std::fmt::Display`] for
//! debugging; the rendering plays no part in evaluation.

pub mod env;
pub mod matrix;
pub mod scalar;
pub mod vector;

pub use env::{EvalError, VarEnv};
pub use matrix::MatrixExpr;
pub use scalar::ScalarExpr;
pub use vector::VectorExpr;
