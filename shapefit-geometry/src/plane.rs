//! Plane primitive and plane-adjacent helpers

use serde::{Deserialize, Serialize};
use shapefit_core::{Error, Point3d, Result, Vector3d};

/// Coefficient magnitudes below this are treated as zero
const NORMAL_EPSILON: f64 = 1e-12;

/// An infinite plane in normal form `a·x + b·y + c·z − d = 0`
///
/// The coefficients always satisfy `a² + b² + c² = 1`: constructors
/// normalize their input, so `(a, b, c)` is the unit normal and `d` is the
/// signed distance of the plane from the origin along that normal.
///
/// Planes are produced as fit results and are immutable; downstream code
/// (plotting in particular) reads the `a`, `b`, `c`, `d` fields by name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Plane {
    /// Create a plane from normal-form coefficients
    ///
    /// The coefficients are scaled so that the normal has unit length,
    /// which leaves the plane itself unchanged. Non-finite input or a
    /// (near-)zero normal is rejected.
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        if !(a.is_finite() && b.is_finite() && c.is_finite() && d.is_finite()) {
            return Err(Error::InvalidGeometry(
                "plane coefficients must be finite".to_string(),
            ));
        }

        let norm = (a * a + b * b + c * c).sqrt();
        if norm < NORMAL_EPSILON {
            return Err(Error::InvalidGeometry(
                "plane normal must be nonzero".to_string(),
            ));
        }

        Ok(Self {
            a: a / norm,
            b: b / norm,
            c: c / norm,
            d: d / norm,
        })
    }

    /// Create a plane through `point` with the given normal direction
    pub fn from_point_normal(point: &Point3d, normal: &Vector3d) -> Result<Self> {
        let norm = normal.norm();
        if !norm.is_finite() || norm < NORMAL_EPSILON {
            return Err(Error::InvalidGeometry(
                "plane normal must be finite and nonzero".to_string(),
            ));
        }
        let n = normal / norm;
        Self::new(n.x, n.y, n.z, n.dot(&point.coords))
    }

    /// Get the unit normal vector of the plane
    pub fn normal(&self) -> Vector3d {
        Vector3d::new(self.a, self.b, self.c)
    }

    /// Signed distance from a point to the plane
    ///
    /// Positive on the side the normal points into.
    pub fn signed_distance_to_point(&self, point: &Point3d) -> f64 {
        self.a * point.x + self.b * point.y + self.c * point.z - self.d
    }

    /// Absolute distance from a point to the plane
    pub fn distance_to_point(&self, point: &Point3d) -> f64 {
        self.signed_distance_to_point(point).abs()
    }

    /// Recover a point on the plane from its offset: `d · (a, b, c)`
    pub fn point_from_d(&self) -> Point3d {
        Point3d::from(self.normal() * self.d)
    }

    /// Corner grid of the plane patch over the given x and z limits
    ///
    /// Solves the plane equation for y at each (x, z) corner, returning a
    /// 2×2 grid indexed as `[xi][zi]`, the shape plotting backends take
    /// for surface patches. Fails with [`Error::InvalidGeometry`] when the
    /// normal's y component is (near) zero, since no y(x, z) graph exists
    /// for such a plane.
    pub fn surface_grid(
        &self,
        x_lim: (f64, f64),
        z_lim: (f64, f64),
    ) -> Result<[[Point3d; 2]; 2]> {
        if self.b.abs() < NORMAL_EPSILON {
            return Err(Error::InvalidGeometry(
                "cannot express plane as y(x, z): normal y component is zero".to_string(),
            ));
        }

        let mut grid = [[Point3d::origin(); 2]; 2];
        for (xi, &x) in [x_lim.0, x_lim.1].iter().enumerate() {
            for (zi, &z) in [z_lim.0, z_lim.1].iter().enumerate() {
                let y = (self.d - self.a * x - self.c * z) / self.b;
                grid[xi][zi] = Point3d::new(x, y, z);
            }
        }
        Ok(grid)
    }
}

/// Recover a point on a plane from its normal direction and offset `d`
///
/// `d` is interpreted against the unit-normalized direction, so
/// `plane_point_from_d(n, d)` and `Plane::new(n.x, n.y, n.z, d)?.point_from_d()`
/// agree for unit `n`.
pub fn plane_point_from_d(normal: &Vector3d, d: f64) -> Result<Point3d> {
    let norm = normal.norm();
    if !norm.is_finite() || norm < NORMAL_EPSILON {
        return Err(Error::InvalidGeometry(
            "plane normal must be finite and nonzero".to_string(),
        ));
    }
    Ok(Point3d::from(normal * (d / norm)))
}

/// Plotting geometry for the plane through `point` with the given normal
///
/// Convenience wrapper over [`Plane::surface_grid`] for callers that hold
/// a (point, normal) pair instead of a fitted [`Plane`].
pub fn plane_surface(
    point: &Point3d,
    normal: &Vector3d,
    x_lim: (f64, f64),
    z_lim: (f64, f64),
) -> Result<[[Point3d; 2]; 2]> {
    Plane::from_point_normal(point, normal)?.surface_grid(x_lim, z_lim)
}

/// The pair of points offset `±thickness/2` from `point` along `normal`
///
/// Bounds the slab of space a "thick plane" occupies; drawing or filtering
/// code pairs each returned point with the original normal.
pub fn thick_plane_points(
    point: &Point3d,
    normal: &Vector3d,
    thickness: f64,
) -> Result<(Point3d, Point3d)> {
    if !thickness.is_finite() || thickness < 0.0 {
        return Err(Error::InvalidData(
            "thickness must be finite and non-negative".to_string(),
        ));
    }
    let norm = normal.norm();
    if !norm.is_finite() || norm < NORMAL_EPSILON {
        return Err(Error::InvalidGeometry(
            "plane normal must be finite and nonzero".to_string(),
        ));
    }
    let offset = normal * (0.5 * thickness / norm);
    Ok((point + offset, point - offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_normalizes_coefficients() {
        let plane = Plane::new(0.0, 0.0, 2.0, 4.0).unwrap();
        assert_relative_eq!(plane.c, 1.0);
        assert_relative_eq!(plane.d, 2.0);
        assert_relative_eq!(
            plane.a * plane.a + plane.b * plane.b + plane.c * plane.c,
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_new_rejects_zero_normal() {
        assert!(Plane::new(0.0, 0.0, 0.0, 1.0).is_err());
        assert!(Plane::new(f64::NAN, 0.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_signed_distance() {
        // z = 1 plane
        let plane = Plane::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert_relative_eq!(
            plane.signed_distance_to_point(&Point3d::new(5.0, -3.0, 1.0)),
            0.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            plane.signed_distance_to_point(&Point3d::new(0.0, 0.0, 3.0)),
            2.0
        );
        assert_relative_eq!(plane.distance_to_point(&Point3d::new(0.0, 0.0, -1.0)), 2.0);
    }

    #[test]
    fn test_point_from_d_lies_on_plane() {
        let plane = Plane::new(1.0, 2.0, 2.0, 1.5).unwrap();
        let p = plane.point_from_d();
        assert_relative_eq!(plane.distance_to_point(&p), 0.0, epsilon = 1e-12);

        // the free function normalizes the direction, so the same offset applies
        let q = plane_point_from_d(&Vector3d::new(1.0, 2.0, 2.0), plane.d).unwrap();
        assert_relative_eq!(plane.distance_to_point(&q), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_surface_grid_corners_on_plane() {
        let plane = Plane::new(1.0, 2.0, 2.0, 3.0).unwrap();
        let grid = plane.surface_grid((-1.0, 1.0), (0.0, 2.0)).unwrap();
        for row in &grid {
            for corner in row {
                assert_relative_eq!(plane.distance_to_point(corner), 0.0, epsilon = 1e-12);
            }
        }
        assert_relative_eq!(grid[0][0].x, -1.0);
        assert_relative_eq!(grid[0][0].z, 0.0);
        assert_relative_eq!(grid[1][1].x, 1.0);
        assert_relative_eq!(grid[1][1].z, 2.0);
    }

    #[test]
    fn test_surface_grid_rejects_vertical_plane() {
        // x = 0 plane has no y(x, z) graph
        let plane = Plane::new(1.0, 0.0, 0.0, 0.0).unwrap();
        assert!(plane.surface_grid((-1.0, 1.0), (-1.0, 1.0)).is_err());
    }

    #[test]
    fn test_thick_plane_points() {
        let p = Point3d::new(0.0, 1.0, 0.0);
        let n = Vector3d::new(0.0, 2.0, 0.0);
        let (above, below) = thick_plane_points(&p, &n, 1.0).unwrap();
        assert_relative_eq!(above.y, 1.5);
        assert_relative_eq!(below.y, 0.5);

        assert!(thick_plane_points(&p, &n, -1.0).is_err());
    }
}
