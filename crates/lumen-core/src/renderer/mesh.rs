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

//! Defines the CPU-side mesh geometry fed into `new_mesh`.

use crate::math::Vec3;

/// A pair of vertex indices forming a line segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexLine {
    /// The first endpoint's vertex index.
    pub a: u32,
    /// The second endpoint's vertex index.
    pub b: u32,
}

impl IndexLine {
    /// Creates a line from two vertex indices.
    #[inline]
    pub const fn new(a: u32, b: u32) -> Self {
        Self { a, b }
    }
}

/// A triple of vertex indices forming a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexTriangle {
    /// The first vertex index.
    pub a: u32,
    /// The second vertex index.
    pub b: u32,
    /// The third vertex index.
    pub c: u32,
}

impl IndexTriangle {
    /// Creates a triangle from three vertex indices.
    #[inline]
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }
}

/// Indexed mesh geometry, either a line list or a triangle list.
#[derive(Debug, Clone, PartialEq)]
pub enum Mesh {
    /// 3D vertices connected into line segments.
    IndexedLines {
        /// The vertex positions.
        vertices: Vec<Vec3>,
        /// The line segments, as pairs of vertex indices.
        lines: Vec<IndexLine>,
    },
    /// 3D vertices connected into triangles.
    IndexedTriangles {
        /// The vertex positions.
        vertices: Vec<Vec3>,
        /// The triangles, as triples of vertex indices.
        triangles: Vec<IndexTriangle>,
    },
}

impl Mesh {
    /// Returns the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        match self {
            Mesh::IndexedLines { vertices, .. } | Mesh::IndexedTriangles { vertices, .. } => {
                vertices.len()
            }
        }
    }

    /// Returns the number of indices the mesh draws with.
    pub fn index_count(&self) -> usize {
        match self {
            Mesh::IndexedLines { lines, .. } => lines.len() * 2,
            Mesh::IndexedTriangles { triangles, .. } => triangles.len() * 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_counts() {
        let mesh = Mesh::IndexedTriangles {
            vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            triangles: vec![IndexTriangle::new(0, 1, 2)],
        };
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.index_count(), 3);

        let lines = Mesh::IndexedLines {
            vertices: vec![Vec3::ZERO, Vec3::X],
            lines: vec![IndexLine::new(0, 1)],
        };
        assert_eq!(lines.index_count(), 2);
    }
}
