//! Benchmarks for the distance routine and both fitters

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shapefit_core::{Point3d, PointCloud, Vector3d};
use shapefit_fitting::solver::NelderMeadOptions;
use shapefit_fitting::{cone_loss, fit_cone_with_guess, fit_plane, ConeParameters};
use shapefit_geometry::Cone;

fn plane_cloud(n: usize) -> PointCloud<Point3d> {
    let mut rng = StdRng::seed_from_u64(9);
    let mut cloud = PointCloud::new();
    for _ in 0..n {
        let x = rng.gen_range(-2.0..2.0);
        let y = rng.gen_range(-2.0..2.0);
        let z = 0.4 * x - 0.3 * y + 1.0 + rng.gen_range(-0.01..0.01);
        cloud.push(Point3d::new(x, y, z));
    }
    cloud
}

fn cone_cloud(n: usize) -> PointCloud<Point3d> {
    let mut rng = StdRng::seed_from_u64(10);
    let mut cloud = PointCloud::new();
    for _ in 0..n {
        let t: f64 = rng.gen_range(0.0..1.0);
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let r = 0.5 * (1.0 - t);
        cloud.push(Point3d::new(r * angle.cos(), r * angle.sin(), t));
    }
    cloud
}

fn bench_cone_distance(c: &mut Criterion) {
    let cone = Cone::new(1.0, 0.5, 0.1, -0.2, Point3d::origin()).unwrap();
    let cloud = cone_cloud(1000);

    c.bench_function("cone_distance_1000_points", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for p in &cloud {
                acc += cone.distance_to_point(black_box(p)).distance;
            }
            acc
        })
    });
}

fn bench_cone_loss(c: &mut Criterion) {
    let cloud = cone_cloud(1000);
    let parameters = ConeParameters {
        height: 1.0,
        radius: 0.5,
        ..ConeParameters::default()
    };

    c.bench_function("cone_loss_1000_points", |b| {
        b.iter(|| cone_loss(black_box(&cloud), black_box(&parameters)))
    });
}

fn bench_fit_plane(c: &mut Criterion) {
    let cloud = plane_cloud(500);

    c.bench_function("fit_plane_500_points", |b| {
        b.iter(|| fit_plane(black_box(&cloud)).unwrap())
    });
}

fn bench_fit_cone(c: &mut Criterion) {
    let cloud = cone_cloud(200);
    let guess = ConeParameters {
        height: 1.0,
        radius: 0.5,
        ..ConeParameters::default()
    };

    c.bench_function("fit_cone_200_points", |b| {
        b.iter(|| fit_cone_with_guess(black_box(&cloud), &guess, &NelderMeadOptions::default()))
    });
}

criterion_group!(
    benches,
    bench_cone_distance,
    bench_cone_loss,
    bench_fit_plane,
    bench_fit_cone
);
criterion_main!(benches);
