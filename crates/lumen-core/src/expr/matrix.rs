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

//! Provides matrix-valued expression trees.

use super::env::{EvalError, VarEnv};
use super::scalar::ScalarExpr;
use super::vector::VectorExpr;
use crate::math::Mat4;
use std::fmt;

/// An immutable `Mat4`-valued expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixExpr {
    /// A literal matrix.
    Literal(Mat4),
    /// A translation matrix built from a vector subtree.
    Translation(VectorExpr),
    /// A right-handed perspective projection built from four scalar
    /// subtrees.
    ///
    /// Evaluation panics if `clip_near` does not evaluate to a positive
    /// value, or `clip_far` to something greater than `clip_near` (see
    /// [`Mat4::perspective_rh`]); the author of the expression owns these
    /// preconditions.
    Perspective {
        /// Vertical field of view, in radians.
        fov_y: ScalarExpr,
        /// Viewport width divided by height.
        aspect_ratio: ScalarExpr,
        /// Distance to the near clipping plane.
        clip_near: ScalarExpr,
        /// Distance to the far clipping plane.
        clip_far: ScalarExpr,
    },
}

impl MatrixExpr {
    /// Evaluates the tree against an environment.
    pub fn eval(&self, env: &VarEnv) -> Result<Mat4, EvalError> {
        match self {
            MatrixExpr::Literal(value) => Ok(*value),
            MatrixExpr::Translation(amount) => Ok(Mat4::from_translation(amount.eval(env)?)),
            MatrixExpr::Perspective {
                fov_y,
                aspect_ratio,
                clip_near,
                clip_far,
            } => Ok(Mat4::perspective_rh(
                fov_y.eval(env)?,
                aspect_ratio.eval(env)?,
                clip_near.eval(env)?,
                clip_far.eval(env)?,
            )),
        }
    }
}

impl fmt::Display for MatrixExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixExpr::Literal(value) => write!(f, "{value:?}"),
            MatrixExpr::Translation(amount) => write!(f, "translation({amount})"),
            MatrixExpr::Perspective {
                fov_y,
                aspect_ratio,
                clip_near,
                clip_far,
            } => write!(
                f,
                "perspective(fov_y: {fov_y}, aspect_ratio: {aspect_ratio}, \
                 clip_near: {clip_near}, clip_far: {clip_far})"
            ),
        }
    }
}

impl From<Mat4> for MatrixExpr {
    #[inline]
    fn from(value: Mat4) -> Self {
        Self::Literal(value)
    }
}
