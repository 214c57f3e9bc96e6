//! Batch fitting across independent point clouds
//!
//! A fit touches nothing outside its own inputs, so a batch of clouds can
//! be processed with plain data parallelism. Each entry of the output
//! matches the cloud at the same index, and every individual fit is
//! identical to what the single-cloud function would have produced.

use crate::cone::{fit_cone, ConeFitResult};
use crate::plane::{fit_plane, PlaneFitResult};
use rayon::prelude::*;
use shapefit_core::{Point3d, PointCloud, Result};

/// Fit a plane to every cloud in the batch, in parallel
pub fn fit_planes(clouds: &[PointCloud<Point3d>]) -> Vec<Result<PlaneFitResult>> {
    clouds.par_iter().map(fit_plane).collect()
}

/// Fit a cone to every cloud in the batch, in parallel
///
/// Each fit starts from the default initial guess; see
/// [`fit_cone`](crate::cone::fit_cone) for its caveats.
pub fn fit_cones(clouds: &[PointCloud<Point3d>]) -> Vec<Result<ConeFitResult>> {
    clouds.par_iter().map(fit_cone).collect()
}
