//! Ray-mesh intersection queries.

use crate::float_types::{
    EPSILON, Real,
    parry3d::{
        query::{Ray, RayCast},
        shape::Triangle,
    },
};
use crate::mesh::TriangleMesh;
use nalgebra::{Isometry3, Point3, Vector3};
use std::cmp::Ordering;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A single ray-mesh intersection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Intersection point in world space.
    pub point: Point3<Real>,
    /// Ray parameter at the intersection (a distance for unit directions).
    pub toi: Real,
}

/// Ray-cast one triangle. A parameter at (or numerically on) zero is the ray
/// grazing its own start surface, not a hit.
fn cast_face(mesh: &TriangleMesh, face: &[usize; 3], ray: &Ray, max_toi: Real) -> Option<RayHit> {
    let triangle = Triangle::new(
        mesh.vertices[face[0]],
        mesh.vertices[face[1]],
        mesh.vertices[face[2]],
    );
    let hit = triangle.cast_ray_and_get_normal(&Isometry3::identity(), ray, max_toi, true)?;
    if hit.time_of_impact <= EPSILON {
        return None;
    }
    Some(RayHit {
        point: ray.point_at(hit.time_of_impact),
        toi: hit.time_of_impact,
    })
}

#[cfg(not(feature = "parallel"))]
fn collect_hits(mesh: &TriangleMesh, ray: &Ray, max_toi: Real) -> Vec<RayHit> {
    mesh.faces
        .iter()
        .filter_map(|face| cast_face(mesh, face, ray, max_toi))
        .collect()
}

#[cfg(feature = "parallel")]
fn collect_hits(mesh: &TriangleMesh, ray: &Ray, max_toi: Real) -> Vec<RayHit> {
    mesh.faces
        .par_iter()
        .filter_map(|face| cast_face(mesh, face, ray, max_toi))
        .collect()
}

/// Every intersection of the ray with `mesh`, sorted by ascending parameter,
/// with near-duplicate parameters (shared edges, reentrant corners)
/// collapsed.
pub fn ray_hits(
    origin: &Point3<Real>,
    direction: &Vector3<Real>,
    mesh: &TriangleMesh,
) -> Vec<RayHit> {
    let ray = Ray::new(*origin, *direction);
    let mut hits = collect_hits(mesh, &ray, Real::MAX);
    hits.sort_by(|a, b| a.toi.partial_cmp(&b.toi).unwrap_or(Ordering::Equal));
    hits.dedup_by(|a, b| (a.toi - b.toi).abs() < EPSILON);
    hits
}

/// The nearest strictly-positive intersection within `max_toi`, if any.
pub fn nearest_hit(
    origin: &Point3<Real>,
    direction: &Vector3<Real>,
    mesh: &TriangleMesh,
    max_toi: Real,
) -> Option<RayHit> {
    let ray = Ray::new(*origin, *direction);
    collect_hits(mesh, &ray, max_toi)
        .into_iter()
        .min_by(|a, b| a.toi.partial_cmp(&b.toi).unwrap_or(Ordering::Equal))
}

/// The nearest hit aggregated across several meshes. Ties keep the earlier
/// mesh's hit; only the hit's height matters to callers.
pub fn nearest_hit_many<'a, I>(
    origin: &Point3<Real>,
    direction: &Vector3<Real>,
    meshes: I,
    max_toi: Real,
) -> Option<RayHit>
where
    I: IntoIterator<Item = &'a TriangleMesh>,
{
    let mut best: Option<RayHit> = None;
    for mesh in meshes {
        if let Some(hit) = nearest_hit(origin, direction, mesh, max_toi) {
            if best.map_or(true, |b| hit.toi < b.toi) {
                best = Some(hit);
            }
        }
    }
    best
}
