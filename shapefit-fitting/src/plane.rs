//! Constrained least-squares plane fitting

use crate::solver::{
    solve_least_squares, LeastSquaresProblem, LevenbergMarquardtOptions, SolverStatus,
};
use nalgebra::{DMatrix, DVector, Matrix3, SymmetricEigen};
use serde::{Deserialize, Serialize};
use shapefit_core::{Error, Point3d, PointCloud, Result, Vector3d};
use shapefit_geometry::Plane;

/// Free parameters of the plane model (a, b, c, d)
const PLANE_PARAMETER_COUNT: usize = 4;

/// Weight of the unit-normal constraint row in the residual vector
const CONSTRAINT_WEIGHT: f64 = 1e4;

/// Covariance eigenvalue ratio below which the points span no plane
const DEGENERACY_RATIO: f64 = 1e-12;

/// The plane model as a least-squares problem
///
/// Residual per point: `a·x + b·y + c·z − d`, target zero. Keeping all
/// four coefficients free (instead of solving the plane equation for one
/// coordinate) avoids dividing by a normal component that may be zero for
/// planes parallel to an axis. The scale ambiguity of the homogeneous
/// form is removed by the equality constraint `a² + b² + c² = 1`, carried
/// both as a weighted residual row and as a projection of every iterate
/// back onto the constraint manifold.
struct PlaneProblem<'a> {
    points: &'a [Point3d],
}

impl LeastSquaresProblem for PlaneProblem<'_> {
    fn residual_count(&self) -> usize {
        self.points.len() + 1
    }

    fn parameter_count(&self) -> usize {
        PLANE_PARAMETER_COUNT
    }

    fn residuals(&self, params: &DVector<f64>, out: &mut DVector<f64>) {
        let (a, b, c, d) = (params[0], params[1], params[2], params[3]);
        for (i, p) in self.points.iter().enumerate() {
            out[i] = a * p.x + b * p.y + c * p.z - d;
        }
        out[self.points.len()] = CONSTRAINT_WEIGHT * (a * a + b * b + c * c - 1.0);
    }

    fn jacobian(&self, params: &DVector<f64>, out: &mut DMatrix<f64>) {
        let (a, b, c) = (params[0], params[1], params[2]);
        for (i, p) in self.points.iter().enumerate() {
            out[(i, 0)] = p.x;
            out[(i, 1)] = p.y;
            out[(i, 2)] = p.z;
            out[(i, 3)] = -1.0;
        }
        let last = self.points.len();
        out[(last, 0)] = CONSTRAINT_WEIGHT * 2.0 * a;
        out[(last, 1)] = CONSTRAINT_WEIGHT * 2.0 * b;
        out[(last, 2)] = CONSTRAINT_WEIGHT * 2.0 * c;
        out[(last, 3)] = 0.0;
    }

    fn project(&self, params: &mut DVector<f64>) {
        // dividing the full quadruple by ‖(a, b, c)‖ maps to the same
        // geometric plane with the constraint satisfied exactly
        let norm =
            (params[0] * params[0] + params[1] * params[1] + params[2] * params[2]).sqrt();
        if norm.is_finite() && norm > 0.0 {
            *params /= norm;
        }
    }

    fn tangent_gradient(&self, params: &DVector<f64>, mut gradient: DVector<f64>) -> DVector<f64> {
        // remove the component along the constraint normal (a, b, c, 0);
        // iterates are kept normalized, so that direction is already unit
        let radial = gradient[0] * params[0] + gradient[1] * params[1] + gradient[2] * params[2];
        gradient[0] -= radial * params[0];
        gradient[1] -= radial * params[1];
        gradient[2] -= radial * params[2];
        gradient
    }
}

/// Per-parameter standard deviations of a plane fit
///
/// Field names mirror the plane coefficients they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneUncertainty {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

/// Result of a plane fit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaneFitResult {
    /// The fitted plane; coefficients satisfy `a² + b² + c² = 1`
    pub plane: Plane,
    /// Standard deviations of the coefficients, when the normal matrix
    /// at the solution was invertible
    pub uncertainty: Option<PlaneUncertainty>,
    /// Sum of squared point residuals at the solution
    pub residual_sum_squares: f64,
    /// Solver termination status
    pub status: SolverStatus,
    /// Solver iterations performed
    pub iterations: usize,
}

impl PlaneFitResult {
    /// The fitted plane, or [`Error::NonConvergence`] if the solver did
    /// not converge; a non-converged plane has no geometric meaning.
    pub fn converged_plane(&self) -> Result<&Plane> {
        if self.status.is_converged() {
            Ok(&self.plane)
        } else {
            Err(Error::NonConvergence(
                "plane fit terminated without satisfying its convergence criteria".to_string(),
            ))
        }
    }
}

/// Fit a plane to a point cloud with default solver options
///
/// Estimates the normal-form coefficients `(a, b, c, d)` of the plane
/// `a·x + b·y + c·z − d = 0` minimizing the summed squared residuals over
/// all points, subject to `a² + b² + c² = 1`. The solve is seeded with the
/// principal-component plane (centroid plus smallest covariance
/// eigenvector) and refined by the constrained least-squares solver, which
/// also supplies the parameter uncertainties. Fully deterministic: the
/// same cloud always produces the identical result.
///
/// # Example
/// ```rust
/// use shapefit_core::{Point3d, PointCloud};
/// use shapefit_fitting::fit_plane;
///
/// let mut cloud = PointCloud::new();
/// for i in 0..4 {
///     for j in 0..4 {
///         cloud.push(Point3d::new(i as f64, j as f64, 2.0));
///     }
/// }
///
/// let result = fit_plane(&cloud).unwrap();
/// assert!(result.status.is_converged());
/// assert!(result.plane.c.abs() > 0.99);
/// ```
pub fn fit_plane(cloud: &PointCloud<Point3d>) -> Result<PlaneFitResult> {
    fit_plane_with_options(cloud, &LevenbergMarquardtOptions::default())
}

/// Fit a plane to a point cloud with explicit solver options
pub fn fit_plane_with_options(
    cloud: &PointCloud<Point3d>,
    options: &LevenbergMarquardtOptions,
) -> Result<PlaneFitResult> {
    if cloud.len() < PLANE_PARAMETER_COUNT {
        return Err(Error::IllPosed(format!(
            "plane fit needs at least {} points, got {}",
            PLANE_PARAMETER_COUNT,
            cloud.len()
        )));
    }

    let (seed_normal, seed_d) = principal_plane(cloud.as_slice())?;

    let initial = DVector::from_vec(vec![seed_normal.x, seed_normal.y, seed_normal.z, seed_d]);
    let problem = PlaneProblem {
        points: cloud.as_slice(),
    };
    let solution = solve_least_squares(&problem, initial, options);

    let plane = Plane::new(
        solution.parameters[0],
        solution.parameters[1],
        solution.parameters[2],
        solution.parameters[3],
    )?;

    let uncertainty = solution.covariance.and_then(|cov| {
        let stdev = |i: usize| {
            let v: f64 = cov[(i, i)];
            if v >= 0.0 {
                Some(v.sqrt())
            } else {
                None
            }
        };
        Some(PlaneUncertainty {
            a: stdev(0)?,
            b: stdev(1)?,
            c: stdev(2)?,
            d: stdev(3)?,
        })
    });

    Ok(PlaneFitResult {
        plane,
        uncertainty,
        residual_sum_squares: solution.objective,
        status: solution.status,
        iterations: solution.iterations,
    })
}

/// Principal-component plane through a point set
///
/// Returns the unit normal (smallest covariance eigenvector) and offset
/// `d = n̂ · centroid`. Fails with [`Error::IllPosed`] when the points are
/// all coincident or collinear, in which case no unique plane exists.
/// This doubles as the cheap degeneracy check run before the solver.
fn principal_plane(points: &[Point3d]) -> Result<(Vector3d, f64)> {
    let n = points.len() as f64;
    let centroid = points
        .iter()
        .fold(Vector3d::zeros(), |acc, p| acc + p.coords)
        / n;

    let mut covariance = Matrix3::<f64>::zeros();
    for p in points {
        let delta = p.coords - centroid;
        covariance += delta * delta.transpose();
    }
    covariance /= n;

    let eigen = SymmetricEigen::new(covariance);

    let mut smallest = 0;
    let mut middle_value = f64::INFINITY;
    let mut largest_value: f64 = 0.0;
    for i in 0..3 {
        if eigen.eigenvalues[i] < eigen.eigenvalues[smallest] {
            smallest = i;
        }
        largest_value = largest_value.max(eigen.eigenvalues[i]);
    }
    for i in 0..3 {
        if i != smallest {
            middle_value = middle_value.min(eigen.eigenvalues[i]);
        }
    }

    if largest_value <= 0.0 {
        return Err(Error::IllPosed(
            "all points are coincident; no plane is defined".to_string(),
        ));
    }
    if middle_value <= largest_value * DEGENERACY_RATIO {
        return Err(Error::IllPosed(
            "points are collinear; the plane is not unique".to_string(),
        ));
    }

    let normal = eigen.eigenvectors.column(smallest).normalize();
    let d = normal.dot(&centroid);
    Ok((Vector3d::new(normal[0], normal[1], normal[2]), d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Grid of points on the plane with the given unit normal and offset
    fn plane_cloud(normal: Vector3d, d: f64, noise: f64, seed: u64) -> PointCloud<Point3d> {
        let mut rng = StdRng::seed_from_u64(seed);
        // two directions spanning the plane
        let mut u = normal.cross(&Vector3d::new(1.0, 0.0, 0.0));
        if u.norm_squared() < 1e-12 {
            u = normal.cross(&Vector3d::new(0.0, 1.0, 0.0));
        }
        let u = u.normalize();
        let v = normal.cross(&u);
        let origin = Point3d::from(normal * d);

        let mut cloud = PointCloud::new();
        for i in -5..=5 {
            for j in -5..=5 {
                let mut p = origin + u * (i as f64 * 0.4) + v * (j as f64 * 0.4);
                if noise > 0.0 {
                    p += normal * rng.gen_range(-noise..noise);
                }
                cloud.push(p);
            }
        }
        cloud
    }

    /// Align the fitted coefficients with a reference normal's sign
    fn aligned(plane: &Plane, reference: &Vector3d) -> (f64, f64, f64, f64) {
        if plane.normal().dot(reference) < 0.0 {
            (-plane.a, -plane.b, -plane.c, -plane.d)
        } else {
            (plane.a, plane.b, plane.c, plane.d)
        }
    }

    #[test]
    fn test_exact_plane_is_recovered() {
        let normal = Vector3d::new(1.0, 2.0, 2.0).normalize();
        let d = 1.2;
        let cloud = plane_cloud(normal, d, 0.0, 0);

        let result = fit_plane(&cloud).unwrap();
        assert!(result.status.is_converged());
        assert!(result.residual_sum_squares < 1e-16);

        let (a, b, c, fitted_d) = aligned(&result.plane, &normal);
        assert_relative_eq!(a, normal.x, epsilon = 1e-8);
        assert_relative_eq!(b, normal.y, epsilon = 1e-8);
        assert_relative_eq!(c, normal.z, epsilon = 1e-8);
        assert_relative_eq!(fitted_d, d, epsilon = 1e-8);
    }

    #[test]
    fn test_unit_normal_invariant() {
        let cloud = plane_cloud(Vector3d::new(0.0, 1.0, 0.0), -0.7, 0.01, 7);
        let result = fit_plane(&cloud).unwrap();
        let p = result.plane;
        assert_relative_eq!(p.a * p.a + p.b * p.b + p.c * p.c, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_vertical_plane_has_no_axis_bias() {
        // plane x = 0.5: the reduced y(x, z) parameterization would divide
        // by zero here; the homogeneous model must not care
        let normal = Vector3d::new(1.0, 0.0, 0.0);
        let cloud = plane_cloud(normal, 0.5, 0.0, 0);

        let result = fit_plane(&cloud).unwrap();
        assert!(result.status.is_converged());
        let (a, _, _, fitted_d) = aligned(&result.plane, &normal);
        assert_relative_eq!(a, 1.0, epsilon = 1e-8);
        assert_relative_eq!(fitted_d, 0.5, epsilon = 1e-8);
    }

    #[test]
    fn test_noisy_plane_within_noise_tolerance() {
        let normal = Vector3d::new(2.0, -1.0, 0.5).normalize();
        let d = 0.3;
        let noise = 0.01;
        let cloud = plane_cloud(normal, d, noise, 42);

        let result = fit_plane(&cloud).unwrap();
        assert!(result.status.is_converged());

        let (a, b, c, fitted_d) = aligned(&result.plane, &normal);
        let tolerance = 5.0 * noise;
        assert_relative_eq!(a, normal.x, epsilon = tolerance);
        assert_relative_eq!(b, normal.y, epsilon = tolerance);
        assert_relative_eq!(c, normal.z, epsilon = tolerance);
        assert_relative_eq!(fitted_d, d, epsilon = tolerance);

        let uncertainty = result.uncertainty.expect("covariance available");
        assert!(uncertainty.a.is_finite() && uncertainty.a >= 0.0);
        assert!(uncertainty.d.is_finite() && uncertainty.d >= 0.0);
    }

    #[test]
    fn test_underdetermined_input_is_rejected() {
        let cloud = PointCloud::from_points(vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ]);
        assert!(matches!(fit_plane(&cloud), Err(Error::IllPosed(_))));
    }

    #[test]
    fn test_collinear_input_is_rejected() {
        let cloud =
            PointCloud::from_points((0..10).map(|i| Point3d::new(i as f64, 0.0, 0.0)).collect());
        assert!(matches!(fit_plane(&cloud), Err(Error::IllPosed(_))));
    }

    #[test]
    fn test_coincident_input_is_rejected() {
        let cloud =
            PointCloud::from_points(vec![Point3d::new(1.0, 2.0, 3.0); 8]);
        assert!(matches!(fit_plane(&cloud), Err(Error::IllPosed(_))));
    }

    #[test]
    fn test_idempotent_fit() {
        let cloud = plane_cloud(Vector3d::new(0.3, 0.4, 0.6).normalize(), 0.9, 0.02, 3);
        let first = fit_plane(&cloud).unwrap();
        let second = fit_plane(&cloud).unwrap();

        assert_eq!(first.plane, second.plane);
        assert_eq!(first.residual_sum_squares, second.residual_sum_squares);
        assert_eq!(first.iterations, second.iterations);
        assert_eq!(first.status, second.status);
    }

    #[test]
    fn test_converged_plane_accessor() {
        let cloud = plane_cloud(Vector3d::new(0.0, 0.0, 1.0), 1.0, 0.0, 0);
        let result = fit_plane(&cloud).unwrap();
        assert!(result.converged_plane().is_ok());

        let starved = PlaneFitResult {
            status: SolverStatus::MaxIterationsReached,
            ..result
        };
        assert!(matches!(
            starved.converged_plane(),
            Err(Error::NonConvergence(_))
        ));
    }
}
