//! Shared traits

use crate::point::Point3d;
use crate::point_cloud::PointCloud;

/// Trait for objects with a spatial extent
///
/// Used to pick sensible axis limits when handing fitted shapes to a
/// plotting backend.
pub trait Drawable {
    /// Get the axis-aligned bounding box of the object
    fn bounding_box(&self) -> (Point3d, Point3d);

    /// Get the center point of the object
    fn center(&self) -> Point3d {
        let (min, max) = self.bounding_box();
        Point3d::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }
}

impl Drawable for PointCloud<Point3d> {
    fn bounding_box(&self) -> (Point3d, Point3d) {
        if self.is_empty() {
            return (Point3d::origin(), Point3d::origin());
        }

        let mut min = self.points[0];
        let mut max = self.points[0];

        for p in &self.points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);

            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounding_box_and_center() {
        let cloud = PointCloud::from_points(vec![
            Point3d::new(-1.0, 0.0, 2.0),
            Point3d::new(3.0, -2.0, 0.0),
            Point3d::new(1.0, 1.0, 1.0),
        ]);

        let (min, max) = cloud.bounding_box();
        assert_relative_eq!(min.x, -1.0);
        assert_relative_eq!(min.y, -2.0);
        assert_relative_eq!(min.z, 0.0);
        assert_relative_eq!(max.x, 3.0);
        assert_relative_eq!(max.y, 1.0);
        assert_relative_eq!(max.z, 2.0);

        let center = cloud.center();
        assert_relative_eq!(center.x, 1.0);
        assert_relative_eq!(center.y, -0.5);
        assert_relative_eq!(center.z, 1.0);
    }
}
