//! Cone primitive and point-to-cone distance

use nalgebra::Rotation3;
use serde::{Deserialize, Serialize};
use shapefit_core::{Error, Point3d, Result, Vector3d};

/// Radial distances below this leave the radial direction undefined
const AXIS_EPSILON: f64 = 1e-12;

/// A finite right circular cone
///
/// The shape is described by four scalars (`height` and base `radius`
/// fix the profile, `rot_x` and `rot_y` orient the axis) plus the 3D
/// position of the base circle's center. The unrotated axis points along
/// +z; `rot_x` is applied about the x axis first, then `rot_y` about the
/// y axis. The apex sits at `base_pos + height · axis`.
///
/// Cones are built transiently from candidate parameter vectors during
/// fitting and are never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cone {
    pub height: f64,
    pub radius: f64,
    pub rot_x: f64,
    pub rot_y: f64,
    pub base_pos: Point3d,
}

/// The region of a cone's surface closest to a query point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConeRegion {
    /// Perpendicular foot on the slanted side
    Lateral,
    /// Beyond the apex; the apex point itself is closest
    Apex,
    /// Beyond the base circle; the base rim is closest
    BaseRim,
}

/// Result of a point-to-cone distance query
///
/// The fitters only consume `distance`; the region tag and closest surface
/// point are available for callers that need them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeDistance {
    pub distance: f64,
    pub region: ConeRegion,
    pub closest_point: Point3d,
}

impl Cone {
    /// Create a new cone
    ///
    /// All values must be finite and `height` and `radius` strictly
    /// positive; a zero or negative scale has no defined surface and is
    /// rejected with [`Error::InvalidGeometry`].
    pub fn new(
        height: f64,
        radius: f64,
        rot_x: f64,
        rot_y: f64,
        base_pos: Point3d,
    ) -> Result<Self> {
        let finite = height.is_finite()
            && radius.is_finite()
            && rot_x.is_finite()
            && rot_y.is_finite()
            && base_pos.coords.iter().all(|v| v.is_finite());
        if !finite {
            return Err(Error::InvalidGeometry(
                "cone parameters must be finite".to_string(),
            ));
        }
        if height <= 0.0 || radius <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "cone scale must be positive, got height: {height}, radius: {radius}"
            )));
        }

        Ok(Self {
            height,
            radius,
            rot_x,
            rot_y,
            base_pos,
        })
    }

    /// Unit vector along the axis, from base center toward the apex
    pub fn axis(&self) -> Vector3d {
        Rotation3::from_euler_angles(self.rot_x, self.rot_y, 0.0) * Vector3d::new(0.0, 0.0, 1.0)
    }

    /// Position of the apex
    pub fn apex(&self) -> Point3d {
        self.base_pos + self.axis() * self.height
    }

    /// Half-angle at the apex: `atan(radius / height)`
    pub fn opening_angle(&self) -> f64 {
        (self.radius / self.height).atan()
    }

    /// Length of the slanted side from base rim to apex
    pub fn slant_height(&self) -> f64 {
        self.radius.hypot(self.height)
    }

    /// Minimum distance from a point to the cone's lateral surface
    ///
    /// The point is decomposed into an axial height `h` above the base
    /// plane and a radial distance `r` from the axis. In that half-plane
    /// the lateral surface is the segment from `(radius, 0)` to
    /// `(0, height)`, and the query reduces to a 2D point-to-segment
    /// distance. The clamped segment parameter tells which region realized
    /// the minimum: beyond the apex the apex point itself is closest (a
    /// point on the axis above the apex is exactly `h − height` away),
    /// beyond the base circle the rim is closest.
    pub fn distance_to_point(&self, point: &Point3d) -> ConeDistance {
        let axis = self.axis();
        let v = point - self.base_pos;
        let h = v.dot(&axis);
        let radial = v - axis * h;
        let r = radial.norm();

        // closest point on the profile segment (radius, 0) -> (0, height)
        let sr = -self.radius;
        let sh = self.height;
        let t = (((r - self.radius) * sr + h * sh) / (sr * sr + sh * sh)).clamp(0.0, 1.0);
        let cr = self.radius + t * sr;
        let ch = t * sh;
        let distance = (r - cr).hypot(h - ch);

        let region = if t <= 0.0 {
            ConeRegion::BaseRim
        } else if t >= 1.0 {
            ConeRegion::Apex
        } else {
            ConeRegion::Lateral
        };

        // radial direction; points on the axis take a fixed perpendicular
        // so the result stays deterministic
        let radial_dir = if r > AXIS_EPSILON {
            radial / r
        } else {
            let mut perp = axis.cross(&Vector3d::new(1.0, 0.0, 0.0));
            if perp.norm_squared() < AXIS_EPSILON {
                perp = axis.cross(&Vector3d::new(0.0, 1.0, 0.0));
            }
            perp.normalize()
        };
        let closest_point = self.base_pos + axis * ch + radial_dir * cr;

        ConeDistance {
            distance,
            region,
            closest_point,
        }
    }
}

/// Minimum distance from `point` to the surface of `cone`
///
/// Free-function form of [`Cone::distance_to_point`], the entry point the
/// fitting loss is built on.
pub fn point_distance_to_cone(point: &Point3d, cone: &Cone) -> ConeDistance {
    cone.distance_to_point(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn upright_cone() -> Cone {
        Cone::new(1.0, 0.5, 0.0, 0.0, Point3d::origin()).unwrap()
    }

    #[test]
    fn test_new_rejects_degenerate_scale() {
        assert!(Cone::new(0.0, 0.5, 0.0, 0.0, Point3d::origin()).is_err());
        assert!(Cone::new(1.0, -0.5, 0.0, 0.0, Point3d::origin()).is_err());
        assert!(Cone::new(f64::NAN, 0.5, 0.0, 0.0, Point3d::origin()).is_err());
    }

    #[test]
    fn test_axis_and_apex() {
        let cone = upright_cone();
        assert_relative_eq!(cone.axis().z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(cone.apex().z, 1.0, epsilon = 1e-12);

        // quarter turn about x sends the axis from +z to -y
        let tilted = Cone::new(2.0, 0.5, FRAC_PI_2, 0.0, Point3d::origin()).unwrap();
        let apex = tilted.apex();
        assert_relative_eq!(apex.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(apex.y, -2.0, epsilon = 1e-12);
        assert_relative_eq!(apex.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_opening_angle_and_slant() {
        let cone = Cone::new(1.0, 1.0, 0.0, 0.0, Point3d::origin()).unwrap();
        assert_relative_eq!(cone.opening_angle(), std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(cone.slant_height(), std::f64::consts::SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_distance_zero_on_surface() {
        let cone = upright_cone();
        // halfway up the slant: h = 0.5, r = 0.25
        let on_surface = Point3d::new(0.25, 0.0, 0.5);
        let result = cone.distance_to_point(&on_surface);
        assert_relative_eq!(result.distance, 0.0, epsilon = 1e-12);
        assert_eq!(result.region, ConeRegion::Lateral);
        assert_relative_eq!(
            (result.closest_point - on_surface).norm(),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_distance_beyond_apex_is_apex_distance() {
        let cone = upright_cone();
        let above = Point3d::new(0.0, 0.0, 2.0);
        let result = cone.distance_to_point(&above);
        assert_eq!(result.region, ConeRegion::Apex);
        assert_relative_eq!(result.distance, 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            (result.closest_point - cone.apex()).norm(),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_distance_beyond_base_is_rim_distance() {
        let cone = upright_cone();
        // below the base plane, outside the radius
        let below = Point3d::new(1.5, 0.0, -1.0);
        let result = cone.distance_to_point(&below);
        assert_eq!(result.region, ConeRegion::BaseRim);
        let rim = Point3d::new(0.5, 0.0, 0.0);
        assert_relative_eq!(result.distance, (below - rim).norm(), epsilon = 1e-12);
    }

    #[test]
    fn test_distance_on_axis_inside_cone() {
        let cone = upright_cone();
        let inside = Point3d::new(0.0, 0.0, 0.3);
        let result = cone.distance_to_point(&inside);
        assert!(result.distance > 0.0);
        assert_eq!(result.region, ConeRegion::Lateral);
        // the reported closest point is itself on the surface
        let check = cone.distance_to_point(&result.closest_point);
        assert_relative_eq!(check.distance, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_distance_translates_with_base() {
        let base = Point3d::new(3.0, -2.0, 1.0);
        let cone = Cone::new(1.0, 0.5, 0.0, 0.0, base).unwrap();
        let result = cone.distance_to_point(&Point3d::new(3.0, -2.0, 3.0));
        assert_relative_eq!(result.distance, 1.0, epsilon = 1e-12);
        assert_eq!(result.region, ConeRegion::Apex);
    }

    #[test]
    fn test_free_function_matches_method() {
        let cone = upright_cone();
        let p = Point3d::new(0.7, 0.2, 0.4);
        let a = cone.distance_to_point(&p);
        let b = point_distance_to_cone(&p, &cone);
        assert_eq!(a, b);
    }
}
