//! # Object Picking System
//!
//! Mouse ray-casting against furniture meshes.
//!
//! ## How it works
//!
//! 1. **Pointer to Ray**: pixel position -> normalized device coordinates -> world ray
//! 2. **Broad phase**: reject items whose world-space bounding box the ray misses
//! 3. **Narrow phase**: Möller-Trumbore against every triangle of the item's meshes
//! 4. **Selection**: the closest hit wins
//!
//! Walls and the floor are never candidates, so they cannot occlude furniture.
//!
//! ## Usage
//!
//! ```no_run
//! use furnish::gfx::picking::{pixel_to_ndc, raycast_items, screen_to_ray};
//! # fn demo(graph: &furnish::gfx::scene::SceneGraph,
//! #         camera: &furnish::gfx::camera::OrbitCamera,
//! #         items: Vec<furnish::gfx::scene::NodeId>) {
//! let ndc = pixel_to_ndc((400.0, 300.0), (800.0, 600.0));
//! let ray = screen_to_ray(ndc, camera);
//! if let Some(hit) = raycast_items(graph, items, &ray) {
//!     println!("hit {:?} at {:.2}", hit.item, hit.distance);
//! }
//! # }
//! ```

use cgmath::{ElementWise, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero};

use crate::gfx::{
    camera::{Camera, OrbitCamera},
    scene::{NodeId, SceneGraph},
};

const EPSILON: f32 = 1e-6;

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vector3<f32>,
    /// Always normalized, so hit distances are in world units
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl AABB {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        let Some(first) = vertices.first() else {
            return Self::new(Vector3::zero(), Vector3::zero());
        };

        let mut min = Vector3::from(*first);
        let mut max = min;
        for vertex in vertices.iter().skip(1) {
            min.x = min.x.min(vertex[0]);
            min.y = min.y.min(vertex[1]);
            min.z = min.z.min(vertex[2]);
            max.x = max.x.max(vertex[0]);
            max.y = max.y.max(vertex[1]);
            max.z = max.z.max(vertex[2]);
        }

        Self::new(min, max)
    }

    /// Slab test. Returns the entry distance, or the exit distance when the
    /// origin is inside the box.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t_near = t_min.x.min(t_max.x).max(t_min.y.min(t_max.y)).max(t_min.z.min(t_max.z));
        let t_far = t_min.x.max(t_max.x).min(t_min.y.max(t_max.y)).min(t_min.z.max(t_max.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Bounds of the box after transforming its eight corners
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let mut corners = [[0.0f32; 3]; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let local = Vector4::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
                1.0,
            );
            let world = matrix * local;
            *corner = [world.x / world.w, world.y / world.w, world.z / world.w];
        }
        Self::from_vertices(&corners)
    }
}

/// Infinite plane through `point`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vector3<f32>,
    pub normal: Vector3<f32>,
}

impl Plane {
    pub fn new(point: Vector3<f32>, normal: Vector3<f32>) -> Self {
        Self {
            point,
            normal: normal.normalize(),
        }
    }

    /// Intersection point, or `None` when the ray is parallel to the plane
    /// or the plane lies behind the origin
    pub fn intersect_ray(&self, ray: &Ray) -> Option<Vector3<f32>> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < EPSILON {
            return None;
        }
        let t = self.normal.dot(self.point - ray.origin) / denom;
        if t < 0.0 {
            return None;
        }
        Some(ray.point_at(t))
    }
}

/// Möller-Trumbore ray-triangle test, returning the hit distance
pub fn intersect_triangle(ray: &Ray, triangle: &[Vector3<f32>; 3]) -> Option<f32> {
    let [v0, v1, v2] = *triangle;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}

/// Result of a successful pick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// Root node of the picked item
    pub item: NodeId,
    /// Mesh node the ray actually struck
    pub node: NodeId,
    pub distance: f32,
    pub point: Vector3<f32>,
}

/// Converts a pixel position to normalized device coordinates (-1..1, y up)
pub fn pixel_to_ndc(screen_pos: (f32, f32), screen_size: (f32, f32)) -> (f32, f32) {
    let (x, y) = screen_pos;
    let (width, height) = (screen_size.0.max(1.0), screen_size.1.max(1.0));
    ((2.0 * x) / width - 1.0, 1.0 - (2.0 * y) / height)
}

/// Casts a ray from the camera eye through a point in normalized device coordinates
pub fn screen_to_ray(ndc: (f32, f32), camera: &OrbitCamera) -> Ray {
    let inv_view_proj = camera
        .build_view_projection_matrix()
        .invert()
        .unwrap_or_else(Matrix4::identity);

    // wgpu clip space: depth 0 at the near plane, 1 at the far plane
    let far = inv_view_proj * Vector4::new(ndc.0, ndc.1, 1.0, 1.0);
    let far = Vector3::new(far.x / far.w, far.y / far.w, far.z / far.w);

    let direction = far - camera.eye;
    if direction.magnitude2() <= EPSILON || !direction.x.is_finite() {
        return Ray::new(camera.eye, camera.forward());
    }
    Ray::new(camera.eye, direction)
}

/// Nearest hit among the mesh descendants of `items`.
///
/// Hidden meshes are skipped. Each mesh is first tested against its
/// world-space bounds, then triangle by triangle.
pub fn raycast_items<I>(graph: &SceneGraph, items: I, ray: &Ray) -> Option<PickHit>
where
    I: IntoIterator<Item = NodeId>,
{
    let mut closest: Option<PickHit> = None;

    for item in items {
        for node_id in graph.mesh_descendants(item) {
            let Some(mesh) = graph.get(node_id).and_then(|n| n.mesh.as_ref()) else {
                continue;
            };
            if !graph.get(node_id).is_some_and(|n| n.visible) {
                continue;
            }

            let world = graph.world_matrix(node_id);
            let Some(box_distance) = mesh.mesh.bounds().transform(&world).intersect_ray(ray)
            else {
                continue;
            };
            if closest.is_some_and(|c| box_distance > c.distance) {
                continue;
            }

            for triangle in mesh.mesh.triangles() {
                let world_triangle = triangle.map(|v| (world * v.extend(1.0)).truncate());
                if let Some(distance) = intersect_triangle(ray, &world_triangle) {
                    if closest.map_or(true, |c| distance < c.distance) {
                        closest = Some(PickHit {
                            item,
                            node: node_id,
                            distance,
                            point: ray.point_at(distance),
                        });
                    }
                }
            }
        }
    }

    closest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_creation() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = AABB::from_vertices(&vertices);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        let ray = Ray::new(Vector3::new(0.1, 0.1, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!((aabb.intersect_ray(&ray).unwrap() - 4.0).abs() < 1e-5);

        let ray_miss = Ray::new(Vector3::new(5.0, 0.1, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());
    }

    #[test]
    fn test_triangle_hit_and_miss() {
        let triangle = [
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        let hit = Ray::new(Vector3::new(0.0, 0.0, -3.0), Vector3::new(0.0, 0.0, 1.0));
        assert!((intersect_triangle(&hit, &triangle).unwrap() - 3.0).abs() < 1e-5);

        let behind = Ray::new(Vector3::new(0.0, 0.0, 3.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(intersect_triangle(&behind, &triangle).is_none());

        let beside = Ray::new(Vector3::new(2.0, 0.0, -3.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(intersect_triangle(&beside, &triangle).is_none());
    }

    #[test]
    fn test_plane_intersection() {
        let plane = Plane::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let ray = Ray::new(Vector3::new(1.0, 2.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        let point = plane.intersect_ray(&ray).unwrap();
        assert!((point - Vector3::new(1.0, 2.0, 5.0)).magnitude() < 1e-5);

        let parallel = Ray::new(Vector3::zero(), Vector3::new(1.0, 0.0, 0.0));
        assert!(plane.intersect_ray(&parallel).is_none());
    }

    #[test]
    fn test_center_of_screen_follows_camera_forward() {
        let camera = OrbitCamera::new(Vector3::new(10.0, 10.0, -10.0), Vector3::zero(), 1.5);
        let ray = screen_to_ray(pixel_to_ndc((400.0, 300.0), (800.0, 600.0)), &camera);
        assert!((ray.direction - camera.forward()).magnitude() < 1e-3);
    }
}
