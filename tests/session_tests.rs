use greeble::mesh::TriangleMesh;
use greeble::session::{PileConfig, PlacementSession, ScatterConfig, SessionState};
use nalgebra::{Point3, Vector3};

fn bumpy_strip() -> TriangleMesh {
    // Two slanted triangles with vertex normals, to exercise the
    // interpolation path as well as face selection.
    TriangleMesh::try_new(
        vec![
            Point3::origin(),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 3.0, 1.0),
            Point3::new(0.0, 3.0, 1.0),
        ],
        vec![
            Vector3::z(),
            Vector3::new(0.2, 0.0, 1.0).normalize(),
            Vector3::new(0.0, -0.3, 1.0).normalize(),
            Vector3::z(),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    )
    .unwrap()
}

#[test]
fn same_seed_reproduces_the_same_scatter() {
    let config = ScatterConfig {
        count: 40,
        seed: 7,
        ..ScatterConfig::default()
    };

    let mut a = PlacementSession::scatter(bumpy_strip(), config.clone(), ()).unwrap();
    let mut b = PlacementSession::scatter(bumpy_strip(), config, ()).unwrap();
    a.preview().unwrap();
    b.preview().unwrap();

    assert_eq!(a.placements().len(), 40);
    assert_eq!(a.placements(), b.placements());
}

#[test]
fn repeated_previews_are_idempotent() {
    let config = ScatterConfig {
        count: 25,
        seed: 21,
        ..ScatterConfig::default()
    };
    let mut session = PlacementSession::scatter(bumpy_strip(), config, ()).unwrap();

    let first: Vec<_> = session.preview().unwrap().to_vec();
    let second: Vec<_> = session.preview().unwrap().to_vec();
    assert_eq!(first, second);
}

#[test]
fn different_seeds_scatter_differently() {
    let base = ScatterConfig {
        count: 10,
        ..ScatterConfig::default()
    };
    let mut a = PlacementSession::scatter(
        bumpy_strip(),
        ScatterConfig { seed: 1, ..base.clone() },
        (),
    )
    .unwrap();
    let mut b = PlacementSession::scatter(
        bumpy_strip(),
        ScatterConfig { seed: 2, ..base },
        (),
    )
    .unwrap();
    a.preview().unwrap();
    b.preview().unwrap();
    assert_ne!(a.placements(), b.placements());
}

#[test]
fn same_seed_reproduces_the_same_pile() {
    let config = PileConfig {
        brick_count: 30,
        pile_radius: 15.0,
        seed: 31,
        ..PileConfig::default()
    };

    let mut a = PlacementSession::pile(config.clone(), ()).unwrap();
    let mut b = PlacementSession::pile(config, ()).unwrap();
    a.preview().unwrap();
    b.preview().unwrap();

    assert_eq!(a.placements(), b.placements());
}

#[test]
fn parameter_edit_regenerates_from_the_new_seed() {
    let mut session = PlacementSession::scatter(
        bumpy_strip(),
        ScatterConfig {
            count: 12,
            seed: 5,
            ..ScatterConfig::default()
        },
        (),
    )
    .unwrap();

    let before: Vec<_> = session.preview().unwrap().to_vec();
    session
        .set_scatter_config(ScatterConfig {
            count: 12,
            seed: 6,
            ..ScatterConfig::default()
        })
        .unwrap();
    let after: Vec<_> = session.preview().unwrap().to_vec();
    assert_ne!(before, after);

    // And editing back restores the original batch.
    session
        .set_scatter_config(ScatterConfig {
            count: 12,
            seed: 5,
            ..ScatterConfig::default()
        })
        .unwrap();
    let restored: Vec<_> = session.preview().unwrap().to_vec();
    assert_eq!(before, restored);
}

#[test]
fn commit_hands_over_the_preview_batch() {
    let mut session = PlacementSession::pile(
        PileConfig {
            brick_count: 8,
            seed: 2,
            ..PileConfig::default()
        },
        "brick-proto",
    )
    .unwrap();
    session.preview().unwrap();
    assert_eq!(session.state(), SessionState::Previewing);

    let placements = session.commit();
    assert_eq!(placements.len(), 8);
    assert!(placements.iter().all(|p| p.source == "brick-proto"));
}

#[test]
fn cancel_discards_without_side_effects() {
    let mut session = PlacementSession::scatter(
        bumpy_strip(),
        ScatterConfig {
            count: 6,
            ..ScatterConfig::default()
        },
        (),
    )
    .unwrap();
    session.preview().unwrap();
    session.cancel();
}

#[test]
fn cancellation_keeps_the_partial_batch() {
    let mut session = PlacementSession::pile(
        PileConfig {
            brick_count: 30,
            seed: 13,
            ..PileConfig::default()
        },
        (),
    )
    .unwrap();

    let mut checks = 0;
    session
        .preview_with_cancel(move || {
            checks += 1;
            checks > 10
        })
        .unwrap();
    assert_eq!(session.placements().len(), 10);
    assert_eq!(session.placed_footprints().len(), 10);

    // A full preview afterwards regenerates the whole batch.
    session.preview().unwrap();
    assert_eq!(session.placements().len(), 30);
}

#[test]
fn nothing_is_skipped_on_clean_geometry() {
    let mut session = PlacementSession::scatter(
        bumpy_strip(),
        ScatterConfig {
            count: 20,
            ..ScatterConfig::default()
        },
        (),
    )
    .unwrap();
    session.preview().unwrap();
    assert_eq!(session.skipped(), 0);
    assert_eq!(session.placements().len(), 20);
}
