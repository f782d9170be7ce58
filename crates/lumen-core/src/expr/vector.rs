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

//! Provides vector-valued expression trees.

use super::env::{EvalError, VarEnv};
use super::scalar::ScalarExpr;
use crate::math::Vec3;
use std::fmt;
use std::ops::Mul;

/// An immutable `Vec3`-valued expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorExpr {
    /// A literal vector.
    Literal(Vec3),
    /// A vector subtree uniformly scaled by a scalar subtree.
    Scale(Box<VectorExpr>, ScalarExpr),
}

impl VectorExpr {
    /// Evaluates the tree against an environment.
    pub fn eval(&self, env: &VarEnv) -> Result<Vec3, EvalError> {
        match self {
            VectorExpr::Literal(value) => Ok(*value),
            VectorExpr::Scale(vec, scale) => Ok(vec.eval(env)? * scale.eval(env)?),
        }
    }
}

impl fmt::Display for VectorExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorExpr::Literal(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            VectorExpr::Scale(vec, scale) => write!(f, "({scale} * {vec})"),
        }
    }
}

impl From<Vec3> for VectorExpr {
    #[inline]
    fn from(value: Vec3) -> Self {
        Self::Literal(value)
    }
}

impl Mul<ScalarExpr> for VectorExpr {
    type Output = Self;
    fn mul(self, scale: ScalarExpr) -> Self::Output {
        Self::Scale(Box::new(self), scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_and_scale() {
        let env = VarEnv::new();
        let expr = VectorExpr::from(Vec3::new(1.0, 2.0, 3.0)) * ScalarExpr::from(2.0);
        assert_eq!(expr.eval(&env), Ok(Vec3::new(2.0, 4.0, 6.0)));
    }

    #[test]
    fn test_scale_by_variable() {
        let mut env = VarEnv::new();
        env.set(3, 0.5);
        let expr = VectorExpr::from(Vec3::X) * ScalarExpr::var(3);
        assert_eq!(expr.eval(&env), Ok(Vec3::new(0.5, 0.0, 0.0)));
    }

    #[test]
    fn test_display_rendering() {
        let expr = VectorExpr::from(Vec3::new(1.0, 0.0, 0.0)) * ScalarExpr::var(0);
        assert_eq!(expr.to_string(), "(var0 * (1, 0, 0))");
    }
}
