//! Shape-proximity point filters
//!
//! After fitting a shape it is common to cut the cloud down to the points
//! that actually lie on it: everything within a slab around a plane, or a
//! shell around a cone's surface.

use rayon::prelude::*;
use shapefit_core::{Error, Point3d, PointCloud, Result};
use shapefit_geometry::{Cone, Plane};

fn check_thickness(thickness: f64) -> Result<f64> {
    if !thickness.is_finite() || thickness <= 0.0 {
        return Err(Error::InvalidData(format!(
            "thickness must be positive and finite, got {thickness}"
        )));
    }
    Ok(0.5 * thickness)
}

/// Keep the points within `thickness / 2` of a plane
///
/// The surviving points keep their original order. The distance test runs
/// in parallel across points; membership of each point is independent, so
/// the output does not depend on scheduling.
///
/// # Example
/// ```rust
/// use shapefit_core::{Point3d, PointCloud};
/// use shapefit_geometry::Plane;
/// use shapefit_fitting::filter_points_plane;
///
/// let plane = Plane::new(0.0, 0.0, 1.0, 0.0).unwrap();
/// let cloud = PointCloud::from_points(vec![
///     Point3d::new(0.0, 0.0, 0.01),
///     Point3d::new(0.0, 0.0, 5.0),
/// ]);
///
/// let near = filter_points_plane(&cloud, &plane, 0.1).unwrap();
/// assert_eq!(near.len(), 1);
/// ```
pub fn filter_points_plane(
    cloud: &PointCloud<Point3d>,
    plane: &Plane,
    thickness: f64,
) -> Result<PointCloud<Point3d>> {
    let half = check_thickness(thickness)?;
    let points: Vec<Point3d> = cloud
        .points
        .par_iter()
        .copied()
        .filter(|p| plane.distance_to_point(p) <= half)
        .collect();
    Ok(PointCloud::from_points(points))
}

/// Keep the points within `thickness / 2` of a cone's lateral surface
pub fn filter_points_cone(
    cloud: &PointCloud<Point3d>,
    cone: &Cone,
    thickness: f64,
) -> Result<PointCloud<Point3d>> {
    let half = check_thickness(thickness)?;
    let points: Vec<Point3d> = cloud
        .points
        .par_iter()
        .copied()
        .filter(|p| cone.distance_to_point(p).distance <= half)
        .collect();
    Ok(PointCloud::from_points(points))
}
