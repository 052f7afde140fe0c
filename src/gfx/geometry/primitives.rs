//! # Primitive Shape Generation
//!
//! Axis-aligned boxes with per-face normals and 0..1 UVs on every face.

use super::GeometryData;

// Unit cube corners per face, outward normal first.
const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
    // +Z
    (
        [0.0, 0.0, 1.0],
        [[-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5]],
    ),
    // -Z
    (
        [0.0, 0.0, -1.0],
        [[0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, 0.5, -0.5]],
    ),
    // -X
    (
        [-1.0, 0.0, 0.0],
        [[-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5]],
    ),
    // +X
    (
        [1.0, 0.0, 0.0],
        [[0.5, -0.5, 0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5]],
    ),
    // +Y
    (
        [0.0, 1.0, 0.0],
        [[-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5]],
    ),
    // -Y
    (
        [0.0, -1.0, 0.0],
        [[-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5]],
    ),
];

const FACE_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

/// Generate a box centered at the origin.
///
/// `width` runs along x, `height` along y and `depth` along z. Each face
/// carries its own four vertices so normals stay flat.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();

    for (normal, corners) in FACES.iter() {
        let base = data.vertices.len() as u32;
        for (corner, uv) in corners.iter().zip(FACE_UVS.iter()) {
            data.vertices
                .push([corner[0] * width, corner[1] * height, corner[2] * depth]);
            data.normals.push(*normal);
            data.tex_coords.push(*uv);
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a unit cube centered at the origin
pub fn generate_cube() -> GeometryData {
    generate_box(1.0, 1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    #[test]
    fn test_box_extents() {
        let data = generate_box(0.5, 15.0, 100.0);
        assert_eq!(data.vertex_count(), 24);
        assert_eq!(data.triangle_count(), 12);

        let max_z = data.vertices.iter().map(|v| v[2]).fold(f32::MIN, f32::max);
        let min_x = data.vertices.iter().map(|v| v[0]).fold(f32::MAX, f32::min);
        assert_eq!(max_z, 50.0);
        assert_eq!(min_x, -0.25);
    }

    #[test]
    fn test_winding_faces_outward() {
        let data = generate_cube();
        for tri in data.indices.chunks_exact(3) {
            let [a, b, c] = [
                data.vertices[tri[0] as usize],
                data.vertices[tri[1] as usize],
                data.vertices[tri[2] as usize],
            ];
            let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let n = cross(e1, e2);
            let expected = data.normals[tri[0] as usize];
            let dot = n[0] * expected[0] + n[1] * expected[1] + n[2] * expected[2];
            assert!(dot > 0.0);
        }
    }
}
