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

//! Provides the mutable variable environment expressions are evaluated
//! against.

use std::collections::HashMap;
use std::fmt;

/// An error produced while evaluating an expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The expression referenced an environment slot that was never
    /// populated.
    UnboundVariable {
        /// The slot index the expression referenced.
        index: usize,
    },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UnboundVariable { index } => {
                write!(f, "Expression references unbound variable slot {index}")
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// A mapping from small integer variable slots to current scalar values.
///
/// The environment is not thread-safe by design: it belongs to the render
/// thread, which rewrites the two builtin viewport slots once per draw. All
/// other slots are free for callers to populate out-of-band before
/// submitting a frame.
#[derive(Debug, Clone)]
pub struct VarEnv {
    vars: HashMap<usize, f32>,
}

impl VarEnv {
    /// The builtin slot holding the current viewport width in pixels.
    pub const SCREEN_WIDTH: usize = 0;
    /// The builtin slot holding the current viewport height in pixels.
    pub const SCREEN_HEIGHT: usize = 1;

    /// Creates an environment with the builtin viewport slots set to 1.0.
    pub fn new() -> Self {
        let mut vars = HashMap::new();
        vars.insert(Self::SCREEN_WIDTH, 1.0);
        vars.insert(Self::SCREEN_HEIGHT, 1.0);
        Self { vars }
    }

    /// Writes a value into a slot, creating it if necessary.
    pub fn set(&mut self, index: usize, value: f32) {
        self.vars.insert(index, value);
    }

    /// Reads a slot, failing if it was never populated.
    pub fn get(&self, index: usize) -> Result<f32, EvalError> {
        self.vars
            .get(&index)
            .copied()
            .ok_or(EvalError::UnboundVariable { index })
    }
}

impl Default for VarEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_slots_are_populated() {
        let env = VarEnv::new();
        assert_eq!(env.get(VarEnv::SCREEN_WIDTH), Ok(1.0));
        assert_eq!(env.get(VarEnv::SCREEN_HEIGHT), Ok(1.0));
    }

    #[test]
    fn test_unbound_slot_errors() {
        let env = VarEnv::new();
        assert_eq!(env.get(7), Err(EvalError::UnboundVariable { index: 7 }));
    }

    #[test]
    fn test_set_overwrites() {
        let mut env = VarEnv::new();
        env.set(VarEnv::SCREEN_WIDTH, 800.0);
        env.set(VarEnv::SCREEN_WIDTH, 1024.0);
        assert_eq!(env.get(VarEnv::SCREEN_WIDTH), Ok(1024.0));
    }
}
