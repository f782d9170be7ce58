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

//! Defines the hierarchy of error types for the rendering subsystem.

use crate::expr::EvalError;
use std::fmt;

/// The resource kinds tracked by the registry, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A compiled shader program.
    Shader,
    /// An uploaded mesh buffer.
    Mesh,
    /// A resolved uniform location.
    Uniform,
    /// An allocated image.
    Image,
    /// An allocated framebuffer.
    Framebuffer,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Shader => "shader",
            ResourceKind::Mesh => "mesh",
            ResourceKind::Uniform => "uniform",
            ResourceKind::Image => "image",
            ResourceKind::Framebuffer => "framebuffer",
        };
        write!(f, "{name}")
    }
}

/// An error reported by a [`GpuDevice`](crate::renderer::GpuDevice)
/// backend, carrying the backend's diagnostic text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterError {
    /// The backend diagnostic (e.g. a shader compiler info log).
    pub detail: String,
}

impl AdapterError {
    /// Creates an adapter error from a diagnostic message.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPU adapter failure: {}", self.detail)
    }
}

impl std::error::Error for AdapterError {}

/// A fatal error raised while realizing resources or executing a frame.
///
/// All variants indicate programmer or integration errors rather than
/// expected runtime conditions; none are retried, and a frame that fails
/// issues nothing after the failure point.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A handle was dereferenced that the registry never saw, or a
    /// cross-kind dependency was realized out of order.
    MissingResource {
        /// The kind of the missing resource.
        kind: ResourceKind,
        /// The raw handle value.
        index: u32,
    },
    /// A uniform expression referenced an environment slot that was never
    /// populated.
    UnboundVariable {
        /// The slot index the expression referenced.
        index: usize,
    },
    /// The GPU adapter boundary reported a failure; the full diagnostic is
    /// attached so the caller can decide how to react.
    AdapterFailure {
        /// The backend diagnostic text.
        detail: String,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::MissingResource { kind, index } => {
                write!(f, "No {kind} resource is registered for handle {index}")
            }
            RenderError::UnboundVariable { index } => {
                write!(f, "Uniform expression references unbound variable slot {index}")
            }
            RenderError::AdapterFailure { detail } => {
                write!(f, "GPU adapter failure: {detail}")
            }
        }
    }
}

impl std::error::Error for RenderError {}

impl From<AdapterError> for RenderError {
    fn from(err: AdapterError) -> Self {
        RenderError::AdapterFailure { detail: err.detail }
    }
}

impl From<EvalError> for RenderError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::UnboundVariable { index } => RenderError::UnboundVariable { index },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_handle() {
        let err = RenderError::MissingResource {
            kind: ResourceKind::Mesh,
            index: 3,
        };
        assert_eq!(err.to_string(), "No mesh resource is registered for handle 3");
    }

    #[test]
    fn test_adapter_error_converts_with_diagnostic() {
        let err: RenderError = AdapterError::new("0:12(4): error: syntax error").into();
        assert_eq!(
            err,
            RenderError::AdapterFailure {
                detail: "0:12(4): error: syntax error".to_string()
            }
        );
    }

    #[test]
    fn test_eval_error_converts() {
        let err: RenderError = EvalError::UnboundVariable { index: 4 }.into();
        assert_eq!(err, RenderError::UnboundVariable { index: 4 });
    }
}
