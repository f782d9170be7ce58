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

//! Provides scalar-valued expression trees.

use super::env::{EvalError, VarEnv};
use std::fmt;
use std::ops::{Add, Div, Sub};

/// An immutable scalar-valued expression tree.
///
/// Division carries no zero guard: it follows IEEE-754 semantics and
/// produces an infinity or NaN rather than erroring.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarExpr {
    /// A literal value.
    Literal(f32),
    /// A reference to a [`VarEnv`] slot.
    Var(usize),
    /// The sum of two subtrees.
    Add(Box<ScalarExpr>, Box<ScalarExpr>),
    /// The difference of two subtrees.
    Subtract(Box<ScalarExpr>, Box<ScalarExpr>),
    /// The quotient of two subtrees.
    Divide(Box<ScalarExpr>, Box<ScalarExpr>),
    /// The larger of two subtrees.
    Max(Box<ScalarExpr>, Box<ScalarExpr>),
}

impl ScalarExpr {
    /// Creates a reference to an environment slot.
    #[inline]
    pub fn var(index: usize) -> Self {
        Self::Var(index)
    }

    /// Creates the binary maximum of two expressions.
    pub fn max(a: impl Into<Self>, b: impl Into<Self>) -> Self {
        Self::Max(Box::new(a.into()), Box::new(b.into()))
    }

    /// Evaluates the tree against an environment.
    pub fn eval(&self, env: &VarEnv) -> Result<f32, EvalError> {
        match self {
            ScalarExpr::Literal(value) => Ok(*value),
            ScalarExpr::Var(index) => env.get(*index),
            ScalarExpr::Add(lhs, rhs) => Ok(lhs.eval(env)? + rhs.eval(env)?),
            ScalarExpr::Subtract(lhs, rhs) => Ok(lhs.eval(env)? - rhs.eval(env)?),
            ScalarExpr::Divide(lhs, rhs) => Ok(lhs.eval(env)? / rhs.eval(env)?),
            ScalarExpr::Max(a, b) => Ok(a.eval(env)?.max(b.eval(env)?)),
        }
    }
}

impl fmt::Display for ScalarExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarExpr::Literal(value) => write!(f, "{value}"),
            ScalarExpr::Var(index) => write!(f, "var{index}"),
            ScalarExpr::Add(lhs, rhs) => write!(f, "({lhs} + {rhs})"),
            ScalarExpr::Subtract(lhs, rhs) => write!(f, "({lhs} - {rhs})"),
            ScalarExpr::Divide(lhs, rhs) => write!(f, "({lhs} / {rhs})"),
            ScalarExpr::Max(a, b) => write!(f, "max({a}, {b})"),
        }
    }
}

impl From<f32> for ScalarExpr {
    #[inline]
    fn from(value: f32) -> Self {
        Self::Literal(value)
    }
}

impl Add for ScalarExpr {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::Add(Box::new(self), Box::new(rhs))
    }
}

impl Sub for ScalarExpr {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::Subtract(Box::new(self), Box::new(rhs))
    }
}

impl Div for ScalarExpr {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        Self::Divide(Box::new(self), Box::new(rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_and_add() {
        let env = VarEnv::new();
        let expr = ScalarExpr::from(2.0) + ScalarExpr::from(3.0);
        assert_eq!(expr.eval(&env), Ok(5.0));
    }

    #[test]
    fn test_max() {
        let env = VarEnv::new();
        let expr = ScalarExpr::max(1.0, 4.0);
        assert_eq!(expr.eval(&env), Ok(4.0));
    }

    #[test]
    fn test_subtract_and_divide() {
        let env = VarEnv::new();
        let expr = (ScalarExpr::from(9.0) - ScalarExpr::from(1.0)) / ScalarExpr::from(2.0);
        assert_eq!(expr.eval(&env), Ok(4.0));
    }

    #[test]
    fn test_divide_by_zero_follows_ieee() {
        let env = VarEnv::new();
        let expr = ScalarExpr::from(1.0) / ScalarExpr::from(0.0);
        assert_eq!(expr.eval(&env), Ok(f32::INFINITY));
    }

    #[test]
    fn test_var_lookup() {
        let mut env = VarEnv::new();
        env.set(5, 12.5);
        assert_eq!(ScalarExpr::var(5).eval(&env), Ok(12.5));
        assert_eq!(
            ScalarExpr::var(6).eval(&env),
            Err(EvalError::UnboundVariable { index: 6 })
        );
    }

    #[test]
    fn test_eval_is_deterministic() {
        let mut env = VarEnv::new();
        env.set(2, 0.125);
        let expr = ScalarExpr::max(
            ScalarExpr::var(2) / ScalarExpr::from(3.0),
            ScalarExpr::from(0.01),
        );
        let first = expr.eval(&env).unwrap();
        let second = expr.eval(&env).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_display_rendering() {
        let expr = ScalarExpr::max(
            ScalarExpr::var(0) + ScalarExpr::from(2.0),
            ScalarExpr::from(1.0) / ScalarExpr::var(1),
        );
        assert_eq!(expr.to_string(), "max((var0 + 2), (1 / var1))");
    }
}
