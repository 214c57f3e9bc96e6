//! Cone fitting by direct distance minimization
//!
//! Unlike the plane, a cone's surface distance has no usable closed-form
//! residual: the nearest-point-on-cone problem is itself piecewise (apex,
//! lateral surface, base rim) and not globally differentiable. The fit
//! therefore minimizes the summed squared geometric distances directly
//! with a gradient-free simplex solver.

use crate::solver::{minimize, NelderMeadOptions, SolverStatus};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use shapefit_core::{Error, Point3d, PointCloud, Result};
use shapefit_geometry::Cone;

/// Free parameters of the cone model
const CONE_PARAMETER_COUNT: usize = 7;

/// Loss substituted for undefined or non-finite distances
///
/// Large enough to dominate any realistic residual, finite so the solver
/// keeps ordering candidates instead of aborting on arithmetic faults.
const DEGENERATE_PENALTY: f64 = 1e30;

/// The 7 free parameters of a cone fit
///
/// Field names match the [`Cone`] constructor one-to-one: four shape
/// scalars plus the base position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeParameters {
    pub height: f64,
    pub radius: f64,
    pub rot_x: f64,
    pub rot_y: f64,
    pub base: Point3d,
}

impl Default for ConeParameters {
    /// The mild near-degenerate starting cone near the origin
    fn default() -> Self {
        Self {
            height: 0.5,
            radius: 0.5,
            rot_x: 0.0,
            rot_y: 0.0,
            base: Point3d::origin(),
        }
    }
}

impl ConeParameters {
    /// Read parameters from a 7-element slice ordered
    /// `(height, radius, rot_x, rot_y, base_x, base_y, base_z)`
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        if values.len() != CONE_PARAMETER_COUNT {
            return Err(Error::InvalidData(format!(
                "cone parameter vector must have {} elements, got {}",
                CONE_PARAMETER_COUNT,
                values.len()
            )));
        }
        Ok(Self {
            height: values[0],
            radius: values[1],
            rot_x: values[2],
            rot_y: values[3],
            base: Point3d::new(values[4], values[5], values[6]),
        })
    }

    /// Pack the parameters into the solver's vector layout
    pub fn to_vector(&self) -> DVector<f64> {
        DVector::from_vec(vec![
            self.height,
            self.radius,
            self.rot_x,
            self.rot_y,
            self.base.x,
            self.base.y,
            self.base.z,
        ])
    }

    /// Materialize the cone these parameters describe
    pub fn cone(&self) -> Result<Cone> {
        Cone::new(self.height, self.radius, self.rot_x, self.rot_y, self.base)
    }
}

/// Result of a cone fit, mirroring the solver's report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConeFitResult {
    /// Best-found parameter vector
    pub parameters: ConeParameters,
    /// Achieved objective: sum of squared point-to-surface distances
    pub objective: f64,
    /// Solver termination status
    pub status: SolverStatus,
    /// Solver iterations performed
    pub iterations: usize,
    /// Objective evaluations performed
    pub evaluations: usize,
}

impl ConeFitResult {
    /// Materialize the fitted cone
    ///
    /// Fails with [`Error::InvalidGeometry`] in the degenerate case where
    /// the best-found vector does not describe a valid cone; the raw
    /// parameters remain available either way.
    pub fn cone(&self) -> Result<Cone> {
        self.parameters.cone()
    }
}

/// Sum of squared point-to-surface distances for a candidate cone
///
/// This is the loss [`fit_cone`] minimizes. A parameter vector that does
/// not describe a valid cone, or a distance that comes back non-finite,
/// contributes a large finite penalty instead, so invalid regions repel the
/// solver rather than crashing the fit. Points are summed in cloud order,
/// so the value is reproducible bit-for-bit.
pub fn cone_loss(cloud: &PointCloud<Point3d>, parameters: &ConeParameters) -> f64 {
    let cone = match parameters.cone() {
        Ok(cone) => cone,
        Err(_) => return DEGENERATE_PENALTY,
    };

    let mut sum = 0.0;
    for point in cloud {
        let distance = cone.distance_to_point(point).distance;
        let squared = distance * distance;
        sum += if squared.is_finite() {
            squared
        } else {
            DEGENERATE_PENALTY
        };
    }

    if sum.is_finite() {
        sum
    } else {
        DEGENERATE_PENALTY
    }
}

/// Fit a cone to a point cloud from the default initial guess
///
/// Minimizes [`cone_loss`] over all 7 parameters with the Nelder–Mead
/// solver. Non-convergence is not an error at this layer: the returned
/// result carries whatever the solver reported and callers interpret the
/// status.
///
/// The default starting cone (`ConeParameters::default()`) is asymmetric
/// and close to degenerate; like any local minimizer this fit can settle
/// into a local minimum far from the global one when started far from the
/// truth. Callers with a rough idea of the answer should pass it through
/// [`fit_cone_with_guess`], and callers without one are advised to run
/// several guesses and keep the lowest objective.
///
/// # Example
/// ```rust
/// use shapefit_core::{Point3d, PointCloud};
/// use shapefit_fitting::{fit_cone_with_guess, ConeParameters};
/// use shapefit_fitting::solver::NelderMeadOptions;
///
/// // points on the cone with height 1, radius 0.5, axis +z
/// let mut cloud = PointCloud::new();
/// for i in 0..20 {
///     let angle = i as f64 * 0.3;
///     let t = (i % 5) as f64 / 5.0;
///     let r = 0.5 * (1.0 - t);
///     cloud.push(Point3d::new(r * angle.cos(), r * angle.sin(), t));
/// }
///
/// let truth = ConeParameters {
///     height: 1.0,
///     radius: 0.5,
///     ..ConeParameters::default()
/// };
/// let result = fit_cone_with_guess(&cloud, &truth, &NelderMeadOptions::default()).unwrap();
/// assert!(result.objective < 1e-6);
/// ```
pub fn fit_cone(cloud: &PointCloud<Point3d>) -> Result<ConeFitResult> {
    fit_cone_with_guess(
        cloud,
        &ConeParameters::default(),
        &NelderMeadOptions::default(),
    )
}

/// Fit a cone to a point cloud from an explicit initial guess
pub fn fit_cone_with_guess(
    cloud: &PointCloud<Point3d>,
    initial: &ConeParameters,
    options: &NelderMeadOptions,
) -> Result<ConeFitResult> {
    if cloud.len() < CONE_PARAMETER_COUNT {
        return Err(Error::IllPosed(format!(
            "cone fit needs at least {} points, got {}",
            CONE_PARAMETER_COUNT,
            cloud.len()
        )));
    }

    let objective = |x: &DVector<f64>| match ConeParameters::from_slice(x.as_slice()) {
        Ok(parameters) => cone_loss(cloud, &parameters),
        Err(_) => DEGENERATE_PENALTY,
    };

    let report = minimize(objective, &initial.to_vector(), options);
    let parameters = ConeParameters::from_slice(report.parameters.as_slice())?;

    Ok(ConeFitResult {
        parameters,
        objective: report.objective,
        status: report.status,
        iterations: report.iterations,
        evaluations: report.evaluations,
    })
}
