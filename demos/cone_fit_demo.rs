//! Cone Fitting Demo
//!
//! Samples the lateral surface of a known cone, fits from a nearby guess
//! and from the default guess, and prints both reports: a small
//! illustration of how strongly the distance-minimization fit depends on
//! its starting point.

use anyhow::Result;
use rand::prelude::*;
use shapefit_core::{Point3d, PointCloud, Vector3d};
use shapefit_fitting::solver::NelderMeadOptions;
use shapefit_fitting::{cone_loss, fit_cone, fit_cone_with_guess, ConeFitResult, ConeParameters};

fn main() -> Result<()> {
    println!("=== Cone Fitting Demo ===\n");

    let truth = ConeParameters {
        height: 1.2,
        radius: 0.6,
        rot_x: 0.15,
        rot_y: -0.1,
        base: Point3d::new(0.4, -0.3, 0.2),
    };
    let cloud = sample_cone(&truth, 240);

    println!("Input points: {}", cloud.len());
    println!("Loss at the true parameters: {:.6e}", cone_loss(&cloud, &truth));

    // a guess in the right neighborhood
    let guess = ConeParameters {
        height: 1.0,
        radius: 0.5,
        rot_x: 0.0,
        rot_y: 0.0,
        base: Point3d::new(0.3, -0.2, 0.1),
    };
    println!("\n1. Fit from a nearby guess:");
    report(&fit_cone_with_guess(&cloud, &guess, &NelderMeadOptions::default())?);

    // the default near-degenerate guess may land in a local minimum
    println!("\n2. Fit from the default guess:");
    report(&fit_cone(&cloud)?);

    Ok(())
}

fn report(result: &ConeFitResult) {
    let p = &result.parameters;
    println!(
        "   height = {:.4}, radius = {:.4}, rot_x = {:.4}, rot_y = {:.4}",
        p.height, p.radius, p.rot_x, p.rot_y
    );
    println!(
        "   base = ({:.4}, {:.4}, {:.4})",
        p.base.x, p.base.y, p.base.z
    );
    println!(
        "   objective = {:.6e}, status = {:?}, iterations = {}, evaluations = {}",
        result.objective, result.status, result.iterations, result.evaluations
    );
}

/// Random samples on the cone's lateral surface
fn sample_cone(parameters: &ConeParameters, n: usize) -> PointCloud<Point3d> {
    let cone = parameters.cone().expect("demo parameters are valid");
    let axis = cone.axis();
    let mut u = axis.cross(&Vector3d::new(1.0, 0.0, 0.0));
    if u.norm_squared() < 1e-12 {
        u = axis.cross(&Vector3d::new(0.0, 1.0, 0.0));
    }
    let u = u.normalize();
    let v = axis.cross(&u);

    let mut rng = StdRng::seed_from_u64(23);
    let mut cloud = PointCloud::new();
    for _ in 0..n {
        let t: f64 = rng.gen_range(0.0..1.0);
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let r = cone.radius * (1.0 - t);
        let radial = u * angle.cos() + v * angle.sin();
        cloud.push(cone.base_pos + axis * (cone.height * t) + radial * r);
    }
    cloud
}
