//! CPU-side triangle meshes
//!
//! Meshes are immutable once built and shared through `Arc` between the
//! scene graph, the picker and the render engine's buffer cache.

use cgmath::{InnerSpace, Vector3};

use crate::gfx::{geometry::GeometryData, picking::AABB};

use super::vertex::Vertex3D;

#[derive(Debug, Clone)]
pub struct MeshData {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    bounds: AABB,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let positions: Vec<[f32; 3]> = vertices.iter().map(|v| v.position).collect();
        let bounds = AABB::from_vertices(&positions);
        Self {
            vertices,
            indices,
            bounds,
        }
    }

    /// Builds a mesh from flat position/normal/uv arrays.
    ///
    /// Missing normals are computed by averaging face normals; missing
    /// texture coordinates default to zero.
    pub fn from_arrays(
        positions: &[[f32; 3]],
        normals: Option<&[[f32; 3]]>,
        tex_coords: Option<&[[f32; 2]]>,
        indices: Vec<u32>,
    ) -> Self {
        let computed;
        let normals = match normals {
            Some(n) if n.len() == positions.len() => n,
            _ => {
                computed = Self::calculate_face_normals(positions, &indices);
                &computed[..]
            }
        };

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: normals[i],
                tex_coords: tex_coords
                    .and_then(|uv| uv.get(i).copied())
                    .unwrap_or([0.0, 0.0]),
            })
            .collect();

        Self::new(vertices, indices)
    }

    pub fn from_geometry(geometry: &GeometryData) -> Self {
        let (vertices, indices) = geometry.to_scene_format();
        Self::new(vertices, indices)
    }

    /// Averages face normals onto vertices for meshes shipped without normals
    pub fn calculate_face_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
        let mut sums = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
                continue;
            }
            let v0 = Vector3::from(positions[i0]);
            let v1 = Vector3::from(positions[i1]);
            let v2 = Vector3::from(positions[i2]);
            let face_normal = (v1 - v0).cross(v2 - v0);

            for idx in [i0, i1, i2] {
                sums[idx] += face_normal;
            }
        }

        sums.into_iter()
            .map(|n| {
                if n.magnitude2() > 0.0 {
                    n.normalize().into()
                } else {
                    [0.0, 1.0, 0.0]
                }
            })
            .collect()
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Local-space bounding box
    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates triangles as position triples, skipping out-of-range indices
    pub fn triangles(&self) -> impl Iterator<Item = [Vector3<f32>; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(move |tri| {
            let a = self.vertices.get(tri[0] as usize)?;
            let b = self.vertices.get(tri[1] as usize)?;
            let c = self.vertices.get(tri[2] as usize)?;
            Some([
                Vector3::from(a.position),
                Vector3::from(b.position),
                Vector3::from(c.position),
            ])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_normals_are_computed() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]];
        let mesh = MeshData::from_arrays(&positions, None, None, vec![0, 1, 2]);

        for vertex in mesh.vertices() {
            assert!((vertex.normal[1] - 1.0).abs() < 1e-6);
        }
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_bounds_cover_all_vertices() {
        let positions = [[-1.0, 0.0, 0.0], [2.0, 3.0, 0.0], [0.0, 0.0, 4.0]];
        let mesh = MeshData::from_arrays(&positions, None, None, vec![0, 1, 2]);
        assert_eq!(mesh.bounds().min, Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(mesh.bounds().max, Vector3::new(2.0, 3.0, 4.0));
    }
}
