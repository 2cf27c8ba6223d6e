//! Placement errors

/// All the ways a placement run can fail.
///
/// Per-sample failures (`DegenerateNormal`, `NoSupportSample`) abort only the
/// placement attempt that raised them; the session skips the attempt and
/// reports it through [`PlacementSession::skipped`](crate::session::PlacementSession::skipped).
/// Configuration and mesh errors surface before any geometry work begins.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    /// Sampling was requested on a mesh with zero triangles or zero total area.
    #[error("mesh has no triangles or no surface area to sample")]
    EmptyMesh,
    /// An interpolated or face normal collapsed to zero length.
    #[error("normal of face {face} has zero length")]
    DegenerateNormal {
        /// Index of the face whose normal degenerated.
        face: usize,
    },
    /// A candidate footprint exposed no bottom vertices to raycast from.
    #[error("candidate footprint has no bottom vertices to sample")]
    NoSupportSample,
    /// A configuration value fell outside its documented domain.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
