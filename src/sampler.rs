//! Area-weighted face selection and barycentric point generation.

use crate::errors::PlacementError;
use crate::float_types::{EPSILON, Real};
use crate::mesh::TriangleMesh;
use nalgebra::{Point3, Vector3};
use rand::Rng;

/// Cumulative distribution over face areas, parallel to the mesh's face
/// list. Entries are monotonically non-decreasing; the last entry is the
/// total mesh area. Rebuilt whenever the mesh changes, immutable otherwise.
#[derive(Clone, Debug)]
pub struct AreaCdf {
    cumulative: Vec<Real>,
    total_area: Real,
}

impl AreaCdf {
    /// Accumulate per-face areas into a running sum. Degenerate faces stay
    /// in the table with zero width so indices keep lining up with the face
    /// list; an interior draw can never land on them.
    pub fn build(mesh: &TriangleMesh) -> Result<AreaCdf, PlacementError> {
        let mut cumulative = Vec::with_capacity(mesh.faces.len());
        let mut running = 0.0;
        for face in 0..mesh.faces.len() {
            running += mesh.face_area(face);
            cumulative.push(running);
        }
        if cumulative.last().copied().unwrap_or(0.0) <= 0.0 {
            return Err(PlacementError::EmptyMesh);
        }
        Ok(AreaCdf {
            cumulative,
            total_area: running,
        })
    }

    /// Total mesh area; draws for [`sample_face`](Self::sample_face) live in
    /// `[0, total_area)`.
    pub fn total_area(&self) -> Real {
        self.total_area
    }

    /// Number of faces covered by the table.
    pub fn face_count(&self) -> usize {
        self.cumulative.len()
    }

    /// Select the face whose cumulative-area interval contains `draw`.
    ///
    /// Lower-bound search: the first face whose running sum is `>= draw`
    /// wins, so a draw landing exactly on an interval boundary resolves to
    /// the lower face. Selection probability is exactly proportional to face
    /// area, independent of face ordering. Draws at or past the total clamp
    /// to the last face.
    pub fn sample_face(&self, draw: Real) -> usize {
        let idx = self.cumulative.partition_point(|&c| c < draw);
        idx.min(self.cumulative.len() - 1)
    }
}

/// A point on a mesh surface with its unit interpolated normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSample {
    /// Position on the face.
    pub point: Point3<Real>,
    /// Unit normal, interpolated from vertex normals when present.
    pub normal: Vector3<Real>,
}

/// Map two independent draws `u, v` in `[0, 1)` to a uniformly distributed
/// point inside face `face`, with its interpolated unit normal.
///
/// Draws with `u + v > 1` are reflected (`u' = 1-u`, `v' = 1-v`) to fold
/// them back across the triangle's diagonal; without the fold the density
/// doubles up in the far corner of the parallelogram.
pub fn sample_point_in_face(
    mesh: &TriangleMesh,
    face: usize,
    u: Real,
    v: Real,
) -> Result<SurfaceSample, PlacementError> {
    let (u, v) = if u + v > 1.0 {
        (1.0 - u, 1.0 - v)
    } else {
        (u, v)
    };

    let [a, b, c] = mesh.face_positions(face);
    let point = a + (b - a) * u + (c - a) * v;

    let normal = if mesh.has_vertex_normals() {
        let [ia, ib, ic] = mesh.faces[face];
        let w = 1.0 - u - v;
        mesh.normals[ia] * w + mesh.normals[ib] * u + mesh.normals[ic] * v
    } else {
        mesh.face_normal_raw(face)
    };

    let len = normal.norm();
    if len <= EPSILON {
        return Err(PlacementError::DegenerateNormal { face });
    }

    Ok(SurfaceSample {
        point,
        normal: normal / len,
    })
}

/// One full surface draw in the session's fixed order: face selection first,
/// then the two barycentric coordinates.
pub fn sample_surface<R: Rng + ?Sized>(
    mesh: &TriangleMesh,
    cdf: &AreaCdf,
    rng: &mut R,
) -> Result<SurfaceSample, PlacementError> {
    let draw = rng.random_range(0.0..cdf.total_area());
    let face = cdf.sample_face(draw);
    let u = rng.random::<Real>();
    let v = rng.random::<Real>();
    sample_point_in_face(mesh, face, u, v)
}
