use greeble::float_types::Real;
use greeble::mesh::TriangleMesh;
use greeble::sampler::{AreaCdf, sample_point_in_face};
use nalgebra::Point3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn two_by_two_quad() -> TriangleMesh {
    TriangleMesh::try_new(
        vec![
            Point3::origin(),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ],
        Vec::new(),
        vec![[0, 1, 2], [0, 2, 3]],
    )
    .unwrap()
}

#[test]
fn equal_area_faces_draw_equally() {
    // 2x2 quad split into two triangles of area 2 each; at 10k draws each
    // face must land close to 50%.
    let mesh = two_by_two_quad();
    let cdf = AreaCdf::build(&mesh).unwrap();
    assert!((cdf.total_area() - 4.0).abs() < 1e-12);

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut counts = [0usize; 2];
    for _ in 0..10_000 {
        let draw = rng.random_range(0.0..cdf.total_area());
        counts[cdf.sample_face(draw)] += 1;
    }

    // Within +/- 2% of an even split.
    assert!(
        (4_800..=5_200).contains(&counts[0]),
        "face 0 drawn {} times",
        counts[0]
    );
    assert!(
        (4_800..=5_200).contains(&counts[1]),
        "face 1 drawn {} times",
        counts[1]
    );
}

#[test]
fn face_selection_tracks_area_fractions() {
    // Areas 1 and 3: selection frequency must converge to 25% / 75%.
    let mesh = TriangleMesh::try_new(
        vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(8.0, 0.0, 0.0),
            Point3::new(5.0, 2.0, 0.0),
        ],
        Vec::new(),
        vec![[0, 1, 2], [3, 4, 5]],
    )
    .unwrap();
    let cdf = AreaCdf::build(&mesh).unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut small = 0usize;
    let total = 20_000;
    for _ in 0..total {
        let draw = rng.random_range(0.0..cdf.total_area());
        if cdf.sample_face(draw) == 0 {
            small += 1;
        }
    }

    let fraction = small as Real / total as Real;
    assert!(
        (fraction - 0.25).abs() < 0.02,
        "small face drawn with frequency {fraction}"
    );
}

#[test]
fn points_are_uniform_over_a_triangle() {
    // Partition the right triangle into its four midpoint sub-triangles and
    // check each receives close to a quarter of the samples.
    let mesh = TriangleMesh::try_new(
        vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        Vec::new(),
        vec![[0, 1, 2]],
    )
    .unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(1_234);
    let mut buckets = [0usize; 4];
    let total = 20_000;
    for _ in 0..total {
        let u: Real = rng.random();
        let v: Real = rng.random();
        let sample = sample_point_in_face(&mesh, 0, u, v).unwrap();
        // For this triangle the point's x/y are its barycentric (u', v').
        let (bu, bv) = (sample.point.x, sample.point.y);
        let bw = 1.0 - bu - bv;
        let bucket = if bw >= 0.5 {
            0
        } else if bu >= 0.5 {
            1
        } else if bv >= 0.5 {
            2
        } else {
            3
        };
        buckets[bucket] += 1;
    }

    for (i, &count) in buckets.iter().enumerate() {
        assert!(
            (4_600..=5_400).contains(&count),
            "sub-triangle {i} received {count} of {total} samples"
        );
    }
}

#[test]
fn reflected_draws_land_inside_the_closed_triangle() {
    let mesh = TriangleMesh::try_new(
        vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        Vec::new(),
        vec![[0, 1, 2]],
    )
    .unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut reflected = 0usize;
    while reflected < 2_000 {
        let u: Real = rng.random();
        let v: Real = rng.random();
        if u + v <= 1.0 {
            continue;
        }
        reflected += 1;
        let sample = sample_point_in_face(&mesh, 0, u, v).unwrap();
        let (bu, bv) = (sample.point.x, sample.point.y);
        let bw = 1.0 - bu - bv;
        for weight in [bw, bu, bv] {
            assert!(
                (-1e-12..=1.0).contains(&weight),
                "barycentric weight {weight} outside [0, 1]"
            );
        }
        assert!((bw + bu + bv - 1.0).abs() < 1e-12);
    }
}
