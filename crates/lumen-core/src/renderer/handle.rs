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

//! Defines the opaque handles client code uses to refer to deferred
//! resources.
//!
//! Each kind has its own monotonically increasing counter inside the
//! registry, so a handle is unique among all handles of its kind ever
//! issued and is never reused. Handles carry no payload; equality is by
//! value.

/// An opaque handle to a shader program, issued before compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub u32);

/// An opaque handle to a mesh, issued before its buffers are uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

/// An opaque handle to a named uniform on a shader, issued before the
/// location is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformId(pub u32);

/// An opaque handle to an image, issued before allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u32);

/// An opaque handle to a framebuffer, issued before allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferId(pub u32);

impl FramebufferId {
    /// The reserved handle denoting the default (screen) render target.
    ///
    /// This value is never issued by the allocator and never appears in a
    /// pending-creation queue.
    pub const DEFAULT: Self = Self(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_is_by_value() {
        assert_eq!(ShaderId(1), ShaderId(1));
        assert_ne!(ShaderId(1), ShaderId(2));
    }

    #[test]
    fn test_default_framebuffer_is_reserved_zero() {
        assert_eq!(FramebufferId::DEFAULT, FramebufferId(0));
    }
}
