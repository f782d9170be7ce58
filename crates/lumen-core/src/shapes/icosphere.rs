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

//! Icosphere generation by repeated icosahedron subdivision.

use std::collections::HashMap;

use crate::math::Vec3;
use crate::renderer::mesh::{IndexLine, IndexTriangle, Mesh};

/// The golden ratio, to the precision the base icosahedron needs.
const PHI: f32 = 1.618;

/// Generates a unit-sphere triangle mesh by subdividing an icosahedron.
///
/// Each subdivision splits every triangle into four, sharing midpoint
/// vertices between neighboring triangles, and reprojects the new vertices
/// onto the unit sphere. `subdivisions` of 0 yields the bare icosahedron
/// (12 vertices, 20 triangles); each level quadruples the triangle count.
///
/// Output is deterministic for a given `subdivisions`.
pub fn generate_icosphere(subdivisions: u32) -> Mesh {
    let mut vertices: Vec<Vec3> = [
        Vec3::new(0.0, 1.0, PHI),
        Vec3::new(0.0, 1.0, -PHI),
        Vec3::new(0.0, -1.0, PHI),
        Vec3::new(0.0, -1.0, -PHI),
        Vec3::new(1.0, PHI, 0.0),
        Vec3::new(1.0, -PHI, 0.0),
        Vec3::new(-1.0, PHI, 0.0),
        Vec3::new(-1.0, -PHI, 0.0),
        Vec3::new(PHI, 0.0, 1.0),
        Vec3::new(PHI, 0.0, -1.0),
        Vec3::new(-PHI, 0.0, 1.0),
        Vec3::new(-PHI, 0.0, -1.0),
    ]
    .iter()
    .map(|v| v.normalize())
    .collect();

    let mut triangles = vec![
        IndexTriangle::new(0, 2, 8),
        IndexTriangle::new(0, 2, 10),
        IndexTriangle::new(0, 4, 6),
        IndexTriangle::new(0, 4, 8),
        IndexTriangle::new(0, 6, 10),
        IndexTriangle::new(1, 3, 9),
        IndexTriangle::new(1, 3, 11),
        IndexTriangle::new(1, 4, 6),
        IndexTriangle::new(1, 4, 9),
        IndexTriangle::new(1, 6, 11),
        IndexTriangle::new(2, 5, 7),
        IndexTriangle::new(2, 5, 8),
        IndexTriangle::new(2, 7, 10),
        IndexTriangle::new(3, 5, 7),
        IndexTriangle::new(3, 5, 9),
        IndexTriangle::new(3, 7, 11),
        IndexTriangle::new(4, 8, 9),
        IndexTriangle::new(5, 8, 9),
        IndexTriangle::new(6, 10, 11),
        IndexTriangle::new(7, 10, 11),
    ];

    for _ in 0..subdivisions {
        triangles = subdivide(&mut vertices, &triangles);
    }

    Mesh::IndexedTriangles {
        vertices,
        triangles,
    }
}

fn subdivide(vertices: &mut Vec<Vec3>, triangles: &[IndexTriangle]) -> Vec<IndexTriangle> {
    let mut next = Vec::with_capacity(triangles.len() * 4);
    // Midpoints are shared between the two triangles flanking an edge, so
    // the cache key is the edge with its endpoints in sorted order.
    let mut midpoints: HashMap<IndexLine, u32> = HashMap::new();

    let mut midpoint = |vertices: &mut Vec<Vec3>, x: u32, y: u32| -> u32 {
        let key = IndexLine::new(x.min(y), x.max(y));
        *midpoints.entry(key).or_insert_with(|| {
            let index = vertices.len() as u32;
            vertices.push((vertices[x as usize] + vertices[y as usize]).normalize());
            index
        })
    };

    for tri in triangles {
        let ab = midpoint(vertices, tri.a, tri.b);
        let bc = midpoint(vertices, tri.b, tri.c);
        let ca = midpoint(vertices, tri.c, tri.a);
        next.push(IndexTriangle::new(tri.a, ab, ca));
        next.push(IndexTriangle::new(tri.b, bc, ab));
        next.push(IndexTriangle::new(tri.c, ca, bc));
        next.push(IndexTriangle::new(ab, bc, ca));
    }
    next
}
