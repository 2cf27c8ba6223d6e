//! Placement sessions: configuration, deterministic batch generation, and
//! the preview/commit/cancel state machine.
//!
//! A session owns its random stream and its placed set; nothing here touches
//! process-wide state. All randomness comes from one seeded ChaCha stream
//! consumed in a fixed order, so identical seed + parameters always
//! reproduce an identical placement set.

use crate::errors::PlacementError;
use crate::float_types::{PI, Real, TAU};
use crate::mesh::TriangleMesh;
use crate::sampler::{AreaCdf, sample_surface};
use crate::support::{Footprint, resolve_height};
use nalgebra::{Matrix4, Point3, Rotation3, Translation3, Unit, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Scale applied when a symmetric draw lands at or below zero.
const MIN_SCALE: Real = 0.01;

/// Parameters for scattering copies of a source object over a surface.
///
/// Every `*_variation` range is symmetric: the drawn value is
/// `base ± variation`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScatterConfig {
    /// Number of placements to generate.
    pub count: usize,
    /// Uniform scale base (1.0 keeps the source size).
    pub scale_base: Real,
    /// Symmetric scale variation.
    pub scale_variation: Real,
    /// Offset along the surface normal.
    pub z_offset_base: Real,
    /// Symmetric offset variation.
    pub z_offset_variation: Real,
    /// Maximum spin (rotation about the surface normal), degrees.
    pub spin_max_degrees: Real,
    /// Maximum tilt about the local X and Y axes, degrees.
    pub tilt_max_degrees: Real,
    /// Random stream seed.
    pub seed: u64,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        ScatterConfig {
            count: 50,
            scale_base: 1.0,
            scale_variation: 0.2,
            z_offset_base: 0.0,
            z_offset_variation: 0.0,
            spin_max_degrees: 360.0,
            tilt_max_degrees: 5.0,
            seed: 1234,
        }
    }
}

impl ScatterConfig {
    fn validate(&self) -> Result<(), PlacementError> {
        if self.count == 0 {
            return Err(invalid("count must be positive"));
        }
        if !(self.scale_base > 0.0) {
            return Err(invalid("scale_base must be positive"));
        }
        for (value, name) in [
            (self.scale_variation, "scale_variation"),
            (self.z_offset_variation, "z_offset_variation"),
            (self.spin_max_degrees, "spin_max_degrees"),
            (self.tilt_max_degrees, "tilt_max_degrees"),
        ] {
            if !(value >= 0.0) {
                return Err(invalid(&format!("{name} must be non-negative")));
            }
        }
        if !self.z_offset_base.is_finite() {
            return Err(invalid("z_offset_base must be finite"));
        }
        Ok(())
    }
}

/// Parameters for drop-stacking a pile of bricks.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PileConfig {
    /// Number of bricks to stack.
    pub brick_count: usize,
    /// Brick dimensions: x = length, y = width, z = height.
    pub brick_dimensions: Vector3<Real>,
    /// Gaussian spread of the pile; drop distances are `|N(0, radius / 2)|`.
    pub pile_radius: Real,
    /// Pile centre; its Z is the ground elevation.
    pub center: Point3<Real>,
    /// Random stream seed.
    pub seed: u64,
}

impl Default for PileConfig {
    fn default() -> Self {
        PileConfig {
            brick_count: 50,
            brick_dimensions: Vector3::new(20.0, 10.0, 5.0),
            pile_radius: 50.0,
            center: Point3::origin(),
            seed: 1234,
        }
    }
}

impl PileConfig {
    fn validate(&self) -> Result<(), PlacementError> {
        if self.brick_count == 0 {
            return Err(invalid("brick_count must be positive"));
        }
        for (value, name) in [
            (self.brick_dimensions.x, "brick length"),
            (self.brick_dimensions.y, "brick width"),
            (self.brick_dimensions.z, "brick height"),
        ] {
            if !(value > 0.0) {
                return Err(invalid(&format!("{name} must be positive")));
            }
        }
        if !(self.pile_radius >= 0.0) || !self.pile_radius.is_finite() {
            return Err(invalid("pile_radius must be finite and non-negative"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> PlacementError {
    PlacementError::InvalidConfiguration(msg.to_owned())
}

/// One resolved placement: the transform the external instancer applies to
/// the source object it references.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement<S> {
    /// World transform for the duplicated object. For scatter placements the
    /// source frame has its origin at the object's base centre with +Z up.
    pub transform: Matrix4<Real>,
    /// Reference to the source object to duplicate.
    pub source: S,
}

/// Session lifecycle. `Committed` and `Cancelled` are terminal: the
/// consuming [`PlacementSession::commit`] and [`PlacementSession::cancel`]
/// transitions make them unrepresentable on a live session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting parameter updates; no geometry generated yet.
    Configuring,
    /// Holding a generated preview batch.
    Previewing,
    /// Preview accepted and handed to the caller.
    Committed,
    /// Preview discarded with no persistent effect.
    Cancelled,
}

enum Generator {
    Scatter {
        mesh: TriangleMesh,
        cdf: AreaCdf,
        config: ScatterConfig,
    },
    Pile {
        config: PileConfig,
    },
}

/// A placement run: deterministic generation into a preview set, which the
/// caller either commits or discards.
///
/// Constructed fresh per run; owns its random stream and placed set.
/// Re-entering [`preview`](Self::preview) after a parameter edit discards
/// the old batch and regenerates from the seed, so the same seed and
/// parameters always produce the same result.
pub struct PlacementSession<S: Clone> {
    generator: Generator,
    state: SessionState,
    preview: Vec<Placement<S>>,
    placed: Vec<Footprint>,
    skipped: usize,
    source: S,
}

impl<S: Clone> PlacementSession<S> {
    /// A session scattering `source` over `mesh`.
    ///
    /// Fails fast: configuration errors and an unsampleable mesh surface
    /// before any generation work.
    pub fn scatter(
        mesh: TriangleMesh,
        config: ScatterConfig,
        source: S,
    ) -> Result<Self, PlacementError> {
        config.validate()?;
        let cdf = AreaCdf::build(&mesh)?;
        Ok(PlacementSession {
            generator: Generator::Scatter { mesh, cdf, config },
            state: SessionState::Configuring,
            preview: Vec::new(),
            placed: Vec::new(),
            skipped: 0,
            source,
        })
    }

    /// A session drop-stacking bricks of `source` into a pile.
    pub fn pile(config: PileConfig, source: S) -> Result<Self, PlacementError> {
        config.validate()?;
        Ok(PlacementSession {
            generator: Generator::Pile { config },
            state: SessionState::Configuring,
            preview: Vec::new(),
            placed: Vec::new(),
            skipped: 0,
            source,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Placements generated by the last preview.
    pub fn placements(&self) -> &[Placement<S>] {
        &self.preview
    }

    /// Footprints resolved by the last pile preview, in placement order.
    pub fn placed_footprints(&self) -> &[Footprint] {
        &self.placed
    }

    /// Placement attempts skipped by the last preview (degenerate samples).
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Replace the scatter parameters. Valid while configuring or
    /// previewing; the next [`preview`](Self::preview) regenerates.
    pub fn set_scatter_config(&mut self, config: ScatterConfig) -> Result<(), PlacementError> {
        config.validate()?;
        match &mut self.generator {
            Generator::Scatter { config: current, .. } => {
                *current = config;
                Ok(())
            }
            Generator::Pile { .. } => Err(invalid("session was built for pile placement")),
        }
    }

    /// Replace the pile parameters.
    pub fn set_pile_config(&mut self, config: PileConfig) -> Result<(), PlacementError> {
        config.validate()?;
        match &mut self.generator {
            Generator::Pile { config: current } => {
                *current = config;
                Ok(())
            }
            Generator::Scatter { .. } => Err(invalid("session was built for surface scatter")),
        }
    }

    /// Regenerate the full preview batch from the configured seed.
    pub fn preview(&mut self) -> Result<&[Placement<S>], PlacementError> {
        self.preview_with_cancel(|| false)
    }

    /// Like [`preview`](Self::preview), but checks `should_cancel` between
    /// placements. Cancelling keeps everything generated so far and simply
    /// stops generating more; no partially built placement is retained.
    pub fn preview_with_cancel(
        &mut self,
        mut should_cancel: impl FnMut() -> bool,
    ) -> Result<&[Placement<S>], PlacementError> {
        let PlacementSession {
            generator,
            state,
            preview,
            placed,
            skipped,
            source,
        } = self;

        preview.clear();
        placed.clear();
        *skipped = 0;
        *state = SessionState::Previewing;

        match &*generator {
            Generator::Scatter { mesh, cdf, config } => {
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
                for attempt in 0..config.count {
                    if should_cancel() {
                        tracing::debug!(generated = preview.len(), "scatter preview cancelled");
                        break;
                    }
                    match scatter_transform(mesh, cdf, config, &mut rng) {
                        Ok(transform) => preview.push(Placement {
                            transform,
                            source: source.clone(),
                        }),
                        Err(PlacementError::DegenerateNormal { face }) => {
                            tracing::debug!(attempt, face, "skipping degenerate surface sample");
                            *skipped += 1;
                        }
                        Err(err) => return Err(err),
                    }
                }
                tracing::debug!(
                    placed = preview.len(),
                    skipped = *skipped,
                    "scatter preview generated"
                );
            }
            Generator::Pile { config } => {
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
                let radial = Normal::new(0.0, config.pile_radius / 2.0)
                    .map_err(|_| invalid("pile_radius must be finite and non-negative"))?;
                let ground_z = config.center.z;
                let half_height = config.brick_dimensions.z / 2.0;

                for attempt in 0..config.brick_count {
                    if should_cancel() {
                        tracing::debug!(generated = preview.len(), "pile preview cancelled");
                        break;
                    }
                    let angle = rng.random_range(0.0..TAU);
                    let distance = radial.sample(&mut rng).abs();
                    let x = config.center.x + distance * angle.cos();
                    let y = config.center.y + distance * angle.sin();
                    let yaw = rng.random_range(0.0..360.0);

                    let candidate = Footprint::cuboid(&config.brick_dimensions, yaw, x, y);
                    let support_z = match resolve_height(&candidate, placed, ground_z) {
                        Ok(z) => z,
                        Err(PlacementError::NoSupportSample) => {
                            tracing::debug!(attempt, "skipping unsupportable candidate");
                            *skipped += 1;
                            continue;
                        }
                        Err(err) => return Err(err),
                    };

                    // Bottom of the brick sits exactly at support_z.
                    let lift = support_z + half_height;
                    placed.push(candidate.raised(lift));

                    let transform = Translation3::new(x, y, lift).to_homogeneous()
                        * Rotation3::from_axis_angle(&Vector3::z_axis(), yaw.to_radians())
                            .to_homogeneous();
                    preview.push(Placement {
                        transform,
                        source: source.clone(),
                    });

                    if attempt % 16 == 0 {
                        tracing::trace!(attempt, support_z, "brick stacked");
                    }
                }
                tracing::debug!(placed = preview.len(), "pile preview generated");
            }
        }

        Ok(&self.preview)
    }

    /// Accept the preview: the batch becomes the caller's, the session is
    /// consumed.
    pub fn commit(self) -> Vec<Placement<S>> {
        self.preview
    }

    /// Discard the preview with no persistent effect; the session is
    /// consumed.
    pub fn cancel(self) {}
}

/// Symmetric draw in `[-variation, variation]`.
fn symmetric<R: Rng + ?Sized>(rng: &mut R, variation: Real) -> Real {
    rng.random_range(-variation..=variation)
}

/// Build one scatter transform, drawing in the fixed order: surface sample
/// (face, u, v), then z-offset, scale, spin, tilt-x, tilt-y.
fn scatter_transform<R: Rng + ?Sized>(
    mesh: &TriangleMesh,
    cdf: &AreaCdf,
    config: &ScatterConfig,
    rng: &mut R,
) -> Result<Matrix4<Real>, PlacementError> {
    let sample = sample_surface(mesh, cdf, rng)?;

    let offset = config.z_offset_base + symmetric(rng, config.z_offset_variation);
    let drawn_scale = config.scale_base + symmetric(rng, config.scale_variation);
    let scale = if drawn_scale <= 0.0 { MIN_SCALE } else { drawn_scale };
    let spin = symmetric(rng, config.spin_max_degrees);
    let tilt_x = symmetric(rng, config.tilt_max_degrees);
    let tilt_y = symmetric(rng, config.tilt_max_degrees);

    let origin = sample.point + sample.normal * offset;

    // Frame with +Z along the surface normal. The X/Y choice only has to be
    // stable across runs, not canonical.
    let align = Rotation3::rotation_between(&Vector3::z(), &sample.normal)
        .unwrap_or_else(|| Rotation3::from_axis_angle(&Vector3::x_axis(), PI));
    let local_x = Unit::new_normalize(align * Vector3::x());
    let local_y = Unit::new_normalize(align * Vector3::y());
    let normal_axis = Unit::new_normalize(sample.normal);

    let rotation = Rotation3::from_axis_angle(&local_y, tilt_y.to_radians())
        * Rotation3::from_axis_angle(&local_x, tilt_x.to_radians())
        * Rotation3::from_axis_angle(&normal_axis, spin.to_radians())
        * align;

    Ok(Translation3::new(origin.x, origin.y, origin.z).to_homogeneous()
        * rotation.to_homogeneous()
        * Matrix4::new_scaling(scale))
}
