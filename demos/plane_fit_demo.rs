//! Plane Fitting Demo
//!
//! Builds noisy samples of a known plane, runs the constrained
//! least-squares fit, and prints the recovered coefficients next to the
//! truth, followed by the slab filter and the plotting-surface helper.

use anyhow::Result;
use rand::prelude::*;
use shapefit_core::{Drawable, Point3d, PointCloud, Vector3d};
use shapefit_fitting::{filter_points_plane, fit_plane};

fn main() -> Result<()> {
    println!("=== Plane Fitting Demo ===\n");

    let true_normal = Vector3d::new(0.3, 0.8, 0.5).normalize();
    let true_d = 1.4;
    let cloud = sample_plane(true_normal, true_d, 0.02);

    println!("Input points: {}", cloud.len());
    println!(
        "True plane:   a = {:.4}, b = {:.4}, c = {:.4}, d = {:.4}",
        true_normal.x, true_normal.y, true_normal.z, true_d
    );

    let result = fit_plane(&cloud)?;
    let p = &result.plane;
    println!(
        "Fitted plane: a = {:.4}, b = {:.4}, c = {:.4}, d = {:.4}",
        p.a, p.b, p.c, p.d
    );
    println!("Status:       {:?} after {} iterations", result.status, result.iterations);
    println!("Residual sum of squares: {:.6e}", result.residual_sum_squares);
    if let Some(sigma) = &result.uncertainty {
        println!(
            "Uncertainty:  σa = {:.2e}, σb = {:.2e}, σc = {:.2e}, σd = {:.2e}",
            sigma.a, sigma.b, sigma.c, sigma.d
        );
    }

    // points within a thin slab around the fitted plane
    let slab = filter_points_plane(&cloud, p, 0.08)?;
    println!("\nPoints within ±0.04 of the fitted plane: {}", slab.len());

    // plotting geometry over the cloud's own x/z extent
    let (min, max) = cloud.bounding_box();
    let grid = p.surface_grid((min.x, max.x), (min.z, max.z))?;
    println!("Surface patch corners for plotting:");
    for row in &grid {
        for corner in row {
            println!("  ({:.3}, {:.3}, {:.3})", corner.x, corner.y, corner.z);
        }
    }

    Ok(())
}

/// Noisy grid samples of the plane with the given unit normal and offset
fn sample_plane(normal: Vector3d, d: f64, noise: f64) -> PointCloud<Point3d> {
    let mut rng = StdRng::seed_from_u64(17);
    let mut u = normal.cross(&Vector3d::new(1.0, 0.0, 0.0));
    if u.norm_squared() < 1e-12 {
        u = normal.cross(&Vector3d::new(0.0, 1.0, 0.0));
    }
    let u = u.normalize();
    let v = normal.cross(&u);
    let origin = Point3d::from(normal * d);

    let mut cloud = PointCloud::new();
    for i in -10..=10 {
        for j in -10..=10 {
            let p = origin
                + u * (i as f64 * 0.2)
                + v * (j as f64 * 0.2)
                + normal * rng.gen_range(-noise..noise);
            cloud.push(p);
        }
    }
    cloud
}
