//! Procedural placement on triangle meshes: **area-weighted surface
//! scattering** and **raycast drop-stacking** of rigid footprints.
//!
//! Two cooperating engines make up the core:
//! - a weighted surface sampler ([`sampler`]) that draws uniformly
//!   area-distributed random points with interpolated normals from any
//!   triangulated mesh, and
//! - a support resolver ([`support`]) that rests new rigid bodies on top of
//!   already-placed ones by bidirectional raycasting, with no physics
//!   simulation involved.
//!
//! [`session::PlacementSession`] drives both through a deterministic,
//! seedable preview/commit/cancel loop; the surrounding application supplies
//! meshes through [`convert::MeshConverter`] and instantiates the resulting
//! [`session::Placement`] transforms itself.
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon for the ray-mesh fold
//! - **serde**: serialize/deserialize session configurations

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod convert;
pub mod errors;
pub mod float_types;
pub mod mesh;
pub mod ray;
pub mod sampler;
pub mod session;
pub mod support;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use errors::PlacementError;
pub use mesh::TriangleMesh;
pub use session::{PileConfig, Placement, PlacementSession, ScatterConfig, SessionState};
