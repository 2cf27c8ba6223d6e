//! Conversion of source geometry into a [`TriangleMesh`].
//!
//! The engine never inspects host geometry kinds at use sites; whatever the
//! host hands over (render mesh, tessellated brep, subdivision surface, ...)
//! is resolved once at session start through this trait.

use crate::errors::PlacementError;
use crate::float_types::Real;
use crate::mesh::TriangleMesh;
use nalgebra::{Point3, Vector3};

/// One capability: produce the triangulated mesh this geometry represents.
pub trait MeshConverter {
    /// Convert to an indexed triangle mesh.
    fn to_triangle_mesh(&self) -> Result<TriangleMesh, PlacementError>;
}

impl MeshConverter for TriangleMesh {
    fn to_triangle_mesh(&self) -> Result<TriangleMesh, PlacementError> {
        Ok(self.clone())
    }
}

/// An indexed polygon soup whose faces may be quads or n-gons.
///
/// Faces are fan-triangulated around their first vertex, so concave n-gons
/// should be split by the producer beforehand.
#[derive(Clone, Debug)]
pub struct PolygonSoup {
    /// Vertex positions.
    pub vertices: Vec<Point3<Real>>,
    /// Per-vertex normals; either empty or parallel to `vertices`.
    pub normals: Vec<Vector3<Real>>,
    /// Faces of three or more indices into `vertices`.
    pub faces: Vec<Vec<usize>>,
}

impl MeshConverter for PolygonSoup {
    fn to_triangle_mesh(&self) -> Result<TriangleMesh, PlacementError> {
        let mut triangles = Vec::with_capacity(self.faces.len());
        for (i, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(PlacementError::InvalidConfiguration(format!(
                    "face {} has {} vertices, need at least 3",
                    i,
                    face.len()
                )));
            }
            for window in 1..face.len() - 1 {
                triangles.push([face[0], face[window], face[window + 1]]);
            }
        }
        TriangleMesh::try_new(self.vertices.clone(), self.normals.clone(), triangles)
    }
}
