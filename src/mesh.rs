//! Indexed triangle mesh consumed by the sampler, intersector, and resolver.

use crate::errors::PlacementError;
use crate::float_types::{EPSILON, Real, parry3d::bounding_volume::Aabb};
use nalgebra::{Matrix4, Point3, Rotation3, Translation3, Vector3};
use std::sync::OnceLock;

/// An indexed triangle mesh: vertex positions, optional per-vertex normals,
/// and triangular faces referencing them.
///
/// Built once at the start of a sampling session (usually through a
/// [`MeshConverter`](crate::convert::MeshConverter)) and read-only afterwards;
/// transforms return new meshes.
#[derive(Clone, Debug)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<Real>>,
    /// Per-vertex normals; either empty or parallel to `vertices`.
    pub normals: Vec<Vector3<Real>>,
    /// Triangular faces as indices into `vertices`.
    pub faces: Vec<[usize; 3]>,
    /// Lazily calculated AABB that spans `vertices`.
    bounding_box: OnceLock<Aabb>,
}

impl TriangleMesh {
    /// Build a mesh, validating that every face index is in range and that
    /// `normals` is either empty or parallel to `vertices`.
    pub fn try_new(
        vertices: Vec<Point3<Real>>,
        normals: Vec<Vector3<Real>>,
        faces: Vec<[usize; 3]>,
    ) -> Result<Self, PlacementError> {
        if !normals.is_empty() && normals.len() != vertices.len() {
            return Err(PlacementError::InvalidConfiguration(format!(
                "normal count ({}) does not match vertex count ({})",
                normals.len(),
                vertices.len()
            )));
        }
        for (i, face) in faces.iter().enumerate() {
            for &idx in face {
                if idx >= vertices.len() {
                    return Err(PlacementError::InvalidConfiguration(format!(
                        "face {} references vertex {} out of range ({} vertices)",
                        i,
                        idx,
                        vertices.len()
                    )));
                }
            }
        }
        Ok(TriangleMesh {
            vertices,
            normals,
            faces,
            bounding_box: OnceLock::new(),
        })
    }

    /// Whether per-vertex normals are available for interpolation.
    pub fn has_vertex_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    /// The three corner positions of face `face`.
    pub fn face_positions(&self, face: usize) -> [Point3<Real>; 3] {
        let [a, b, c] = self.faces[face];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Face normal from the two edge vectors, not normalized. Zero for a
    /// degenerate face.
    pub fn face_normal_raw(&self, face: usize) -> Vector3<Real> {
        let [a, b, c] = self.face_positions(face);
        (b - a).cross(&(c - a))
    }

    /// Area of face `face`: half the magnitude of the edge cross product.
    pub fn face_area(&self, face: usize) -> Real {
        0.5 * self.face_normal_raw(face).norm()
    }

    /// Returns an [`Aabb`] spanning all vertices (cached after first call).
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            if self.vertices.is_empty() {
                return Aabb::new(Point3::origin(), Point3::origin());
            }
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
            for v in &self.vertices {
                mins.x = mins.x.min(v.x);
                mins.y = mins.y.min(v.y);
                mins.z = mins.z.min(v.z);
                maxs.x = maxs.x.max(v.x);
                maxs.y = maxs.y.max(v.y);
                maxs.z = maxs.z.max(v.z);
            }
            Aabb::new(mins, maxs)
        })
    }

    /// Apply an arbitrary affine transform (as a 4x4 matrix), returning a new
    /// mesh. Normals transform by the inverse transpose; for the rigid
    /// motions used in this crate that is just the rotation part.
    pub fn transform(&self, mat: &Matrix4<Real>) -> TriangleMesh {
        let normal_mat = mat.try_inverse().map(|inv| inv.transpose());

        let vertices = self
            .vertices
            .iter()
            .map(|p| mat.transform_point(p))
            .collect();

        let normals = self
            .normals
            .iter()
            .map(|n| match &normal_mat {
                Some(m) => {
                    let moved = m.transform_vector(n);
                    let len = moved.norm();
                    if len > EPSILON { moved / len } else { *n }
                }
                // Singular transform; positions still move, normals keep
                // their old direction rather than collapsing.
                None => *n,
            })
            .collect();

        TriangleMesh {
            vertices,
            normals,
            faces: self.faces.clone(),
            bounding_box: OnceLock::new(),
        }
    }

    /// Returns a new mesh translated by x, y, and z.
    pub fn translate(&self, x: Real, y: Real, z: Real) -> TriangleMesh {
        self.transform(&Translation3::new(x, y, z).to_homogeneous())
    }

    /// Returns a new mesh rotated by `degrees` about the world Z axis.
    pub fn rotate_z(&self, degrees: Real) -> TriangleMesh {
        let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), degrees.to_radians());
        self.transform(&rot.to_homogeneous())
    }

    /// An axis-aligned cuboid centred on the origin, as 8 shared vertices and
    /// 12 triangles. No vertex normals are stored; face normals derive from
    /// the winding (CCW seen from outside).
    pub fn cuboid(x_len: Real, y_len: Real, z_len: Real) -> TriangleMesh {
        let hx = x_len / 2.0;
        let hy = y_len / 2.0;
        let hz = z_len / 2.0;

        let vertices = vec![
            Point3::new(-hx, -hy, -hz), // 0
            Point3::new(hx, -hy, -hz),  // 1: +X
            Point3::new(hx, hy, -hz),   // 2: +X+Y
            Point3::new(-hx, hy, -hz),  // 3: +Y
            Point3::new(-hx, -hy, hz),  // 4: +Z
            Point3::new(hx, -hy, hz),   // 5: +X+Z
            Point3::new(hx, hy, hz),    // 6: +X+Y+Z
            Point3::new(-hx, hy, hz),   // 7: +Y+Z
        ];

        // Each quad face split along one diagonal.
        let faces = vec![
            [0, 3, 2], // bottom
            [0, 2, 1],
            [4, 5, 6], // top
            [4, 6, 7],
            [0, 1, 5], // front
            [0, 5, 4],
            [3, 7, 6], // back
            [3, 6, 2],
            [0, 4, 7], // left
            [0, 7, 3],
            [1, 2, 6], // right
            [1, 6, 5],
        ];

        TriangleMesh {
            vertices,
            normals: Vec::new(),
            faces,
            bounding_box: OnceLock::new(),
        }
    }
}
