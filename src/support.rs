//! Drop-stack support resolution for rigid footprints.
//!
//! Resolves the vertical rest position of a new rigid body over a set of
//! already-placed bodies by raycasting, not by simulating dynamics: the
//! result is static vertical support only.

use crate::errors::PlacementError;
use crate::float_types::{EPSILON, Real, parry3d::bounding_volume::Aabb};
use crate::mesh::TriangleMesh;
use crate::ray::{nearest_hit_many, ray_hits};
use nalgebra::{Point3, Vector3};

/// Fraction of a footprint's Z extent treated as its "bottom" when picking
/// raycast sample vertices. Footprints only ever yaw about Z, so the bottom
/// face stays flat and the band only has to absorb floating-point noise.
const BOTTOM_FLATNESS: Real = 1e-4;

/// The rigid bounding volume of one placed object. Used only for support and
/// overlap computation, never for rendering; holds no reference back to the
/// sampled surface or the session. Never mutated after it joins a placed set.
#[derive(Clone, Debug)]
pub struct Footprint {
    mesh: TriangleMesh,
}

impl Footprint {
    /// A cuboid footprint of dimensions `dims` (x = length, y = width,
    /// z = height), yawed about Z and centred on `(x, y, 0)`, so its bottom
    /// face sits at `-dims.z / 2`.
    pub fn cuboid(dims: &Vector3<Real>, yaw_degrees: Real, x: Real, y: Real) -> Footprint {
        let mesh = TriangleMesh::cuboid(dims.x, dims.y, dims.z)
            .rotate_z(yaw_degrees)
            .translate(x, y, 0.0);
        Footprint { mesh }
    }

    /// Wrap an arbitrary world-posed mesh as a footprint.
    pub fn from_mesh(mesh: TriangleMesh) -> Footprint {
        Footprint { mesh }
    }

    /// The footprint's collision mesh.
    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// World-space bounds.
    pub fn bounding_box(&self) -> Aabb {
        self.mesh.bounding_box()
    }

    /// Bottom elevation of the footprint.
    pub fn bottom_z(&self) -> Real {
        self.bounding_box().mins.z
    }

    /// A copy lifted by `dz`.
    pub fn raised(&self, dz: Real) -> Footprint {
        Footprint {
            mesh: self.mesh.translate(0.0, 0.0, dz),
        }
    }

    /// Vertices at (or within the flatness band of) the footprint's minimum
    /// Z, plus their XY centroid.
    fn bottom_samples(&self) -> Vec<Point3<Real>> {
        let bb = self.bounding_box();
        let band = ((bb.maxs.z - bb.mins.z) * BOTTOM_FLATNESS).max(EPSILON);
        let floor = bb.mins.z + band;
        let mut samples: Vec<Point3<Real>> = self
            .mesh
            .vertices
            .iter()
            .copied()
            .filter(|v| v.z <= floor)
            .collect();
        if !samples.is_empty() {
            let inv = 1.0 / samples.len() as Real;
            let (sx, sy) = samples
                .iter()
                .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
            samples.push(Point3::new(sx * inv, sy * inv, bb.mins.z));
        }
        samples
    }
}

fn xy_overlaps(a: &Aabb, b: &Aabb) -> bool {
    a.maxs.x >= b.mins.x && a.mins.x <= b.maxs.x && a.maxs.y >= b.mins.y && a.mins.y <= b.maxs.y
}

/// Minimum bottom elevation at which `candidate` rests on the ground plane
/// or on the placed set, without passing through either.
///
/// Two passes close complementary gaps:
///
/// 1. **Downward**: rays from the candidate's bottom vertices and their
///    centroid, dropped onto the placed set. Catches the candidate landing
///    on top of existing bodies.
/// 2. **Upward**: for placed footprints whose XY bounds overlap the
///    candidate's, every vertex is checked against the candidate's underside
///    at that XY. Catches a raised corner of an existing body poking up
///    through the middle of the candidate's face, which the corner rays of
///    pass 1 straddle when footprints are similarly sized but offset.
///
/// The returned elevation is exact: the caller translates the candidate so
/// its bottom sits at `support_z` with no extra safety margin.
pub fn resolve_height(
    candidate: &Footprint,
    placed: &[Footprint],
    ground_z: Real,
) -> Result<Real, PlacementError> {
    let mut support_z = ground_z;
    if placed.is_empty() {
        return Ok(support_z);
    }

    let samples = candidate.bottom_samples();
    if samples.is_empty() {
        return Err(PlacementError::NoSupportSample);
    }

    let down = -Vector3::z();
    let placed_top = placed
        .iter()
        .map(|f| f.bounding_box().maxs.z)
        .fold(ground_z, Real::max);
    let drop_start = placed_top + 1.0;

    for sample in &samples {
        let origin = Point3::new(sample.x, sample.y, drop_start);
        if let Some(hit) =
            nearest_hit_many(&origin, &down, placed.iter().map(Footprint::mesh), Real::MAX)
        {
            if hit.point.z > support_z {
                support_z = hit.point.z;
            }
        }
    }

    let cand_bb = candidate.bounding_box();
    let cand_bottom = cand_bb.mins.z;
    let probe_start = cand_bb.maxs.z + 1.0;
    for other in placed.iter().filter(|f| xy_overlaps(&f.bounding_box(), &cand_bb)) {
        for v in &other.mesh().vertices {
            let origin = Point3::new(v.x, v.y, probe_start);
            let hits = ray_hits(&origin, &down, candidate.mesh());
            // The deepest hit is the candidate's underside at this XY; the
            // candidate must rise until that surface clears the vertex.
            if let Some(under) = hits.last() {
                let required = v.z - (under.point.z - cand_bottom);
                if required > support_z {
                    support_z = required;
                }
            }
        }
    }

    Ok(support_z)
}
