//! Numerical solvers driving the fitters
//!
//! Two in-house solvers, both deterministic: a damped least-squares
//! (Levenberg–Marquardt) solver for problems with residual vectors and
//! analytic Jacobians, and a gradient-free Nelder–Mead simplex minimizer
//! for scalar objectives that are only piecewise smooth.

pub mod levenberg_marquardt;
pub mod nelder_mead;

pub use levenberg_marquardt::{
    solve_least_squares, LeastSquaresProblem, LeastSquaresSolution, LevenbergMarquardtOptions,
};
pub use nelder_mead::{minimize, MinimizeResult, NelderMeadOptions};

use serde::{Deserialize, Serialize};

/// Termination status reported by the solvers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverStatus {
    /// Tolerance criteria were satisfied
    Converged,
    /// The iteration cap was reached before the tolerances
    MaxIterationsReached,
    /// The linear system became singular or steps stopped making progress
    NumericalFailure,
}

impl SolverStatus {
    /// Whether the solver satisfied its convergence criteria
    pub fn is_converged(&self) -> bool {
        matches!(self, SolverStatus::Converged)
    }
}
