//! Damped least-squares (Levenberg–Marquardt) solver

use super::SolverStatus;
use nalgebra::{DMatrix, DVector};

/// How often the damping may be raised while searching for an acceptable step
const MAX_DAMPING_STEPS: usize = 24;

/// Floor for the Marquardt diagonal scaling
const DAMPING_FLOOR: f64 = 1e-12;

/// A nonlinear least-squares problem with analytic derivatives
///
/// Implementors fill the residual vector and Jacobian for a given
/// parameter vector. The optional [`project`](LeastSquaresProblem::project)
/// hook is applied to the initial guess and to every trial step before it
/// is evaluated; equality constraints are enforced by projecting iterates
/// back onto the constraint manifold there.
pub trait LeastSquaresProblem {
    /// Residual dimension m
    fn residual_count(&self) -> usize;

    /// Parameter dimension n
    fn parameter_count(&self) -> usize;

    /// Fill the residual vector r(params), length m
    fn residuals(&self, params: &DVector<f64>, out: &mut DVector<f64>);

    /// Fill the m×n Jacobian ∂r/∂params
    fn jacobian(&self, params: &DVector<f64>, out: &mut DMatrix<f64>);

    /// Constraint hook applied to every iterate
    fn project(&self, _params: &mut DVector<f64>) {}

    /// Project a gradient onto the tangent space of the constraint
    /// manifold
    ///
    /// At a constrained optimum the full-space gradient is parallel to
    /// the constraint normal (the Lagrange condition), so convergence is
    /// judged on the tangential component. Unconstrained problems keep
    /// the identity default.
    fn tangent_gradient(&self, _params: &DVector<f64>, gradient: DVector<f64>) -> DVector<f64> {
        gradient
    }
}

/// Options for [`solve_least_squares`]
#[derive(Debug, Clone)]
pub struct LevenbergMarquardtOptions {
    /// Iteration cap
    pub max_iterations: usize,
    /// Convergence threshold on the gradient's largest component
    pub gradient_tolerance: f64,
    /// Convergence threshold on the accepted (projected) step length,
    /// relative to the parameter vector's length
    pub step_tolerance: f64,
    /// Initial damping factor λ
    pub initial_damping: f64,
}

impl Default for LevenbergMarquardtOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            gradient_tolerance: 1e-8,
            step_tolerance: 1e-12,
            initial_damping: 1e-3,
        }
    }
}

/// Solution report of [`solve_least_squares`]
#[derive(Debug, Clone)]
pub struct LeastSquaresSolution {
    /// Best parameter vector found (projected)
    pub parameters: DVector<f64>,
    /// Sum of squared residuals at `parameters`
    pub objective: f64,
    /// Termination status
    pub status: SolverStatus,
    /// Iterations performed
    pub iterations: usize,
    /// Parameter covariance `σ²·(JᵀJ)⁻¹` at the solution, with
    /// `σ² = objective / (m − n)`; `None` when the normal matrix is
    /// singular or the problem has no residual surplus (m ≤ n)
    pub covariance: Option<DMatrix<f64>>,
}

/// Minimize a sum of squared residuals with Levenberg–Marquardt
///
/// Classic damped Gauss–Newton: each iteration solves
/// `(JᵀJ + λ·diag(JᵀJ))·δ = −Jᵀr` and accepts the step if the objective
/// does not increase, lowering λ on acceptance and raising it otherwise.
/// Constraints registered through the problem's `project` hook are
/// re-applied to every trial point, so convergence is measured on the
/// projected displacement rather than the raw step.
pub fn solve_least_squares<P: LeastSquaresProblem>(
    problem: &P,
    initial: DVector<f64>,
    options: &LevenbergMarquardtOptions,
) -> LeastSquaresSolution {
    let m = problem.residual_count();
    let n = problem.parameter_count();

    let mut params = initial;
    problem.project(&mut params);

    let mut residuals = DVector::<f64>::zeros(m);
    let mut trial_residuals = DVector::<f64>::zeros(m);
    let mut jacobian = DMatrix::<f64>::zeros(m, n);

    problem.residuals(&params, &mut residuals);
    let mut objective = residuals.norm_squared();

    let mut lambda = options.initial_damping;
    let mut status = SolverStatus::MaxIterationsReached;
    let mut iterations = 0;

    for _ in 0..options.max_iterations {
        iterations += 1;

        problem.jacobian(&params, &mut jacobian);
        let hessian = jacobian.transpose() * &jacobian;
        let gradient = jacobian.transpose() * &residuals;

        if problem
            .tangent_gradient(&params, gradient.clone())
            .amax()
            < options.gradient_tolerance
        {
            status = SolverStatus::Converged;
            break;
        }

        let mut accepted = false;
        for _ in 0..MAX_DAMPING_STEPS {
            let mut system = hessian.clone();
            for i in 0..n {
                system[(i, i)] += lambda * hessian[(i, i)].max(DAMPING_FLOOR);
            }

            let step = match system.lu().solve(&(-&gradient)) {
                Some(step) if step.iter().all(|v| v.is_finite()) => step,
                _ => {
                    lambda *= 10.0;
                    continue;
                }
            };

            let mut trial = &params + &step;
            problem.project(&mut trial);
            problem.residuals(&trial, &mut trial_residuals);
            let trial_objective = trial_residuals.norm_squared();

            if trial_objective.is_finite() && trial_objective <= objective {
                let displacement = (&trial - &params).norm();
                params = trial;
                residuals.copy_from(&trial_residuals);
                objective = trial_objective;
                lambda = (lambda * 0.3).max(1e-12);
                accepted = true;

                if displacement < options.step_tolerance * (params.norm() + options.step_tolerance)
                {
                    status = SolverStatus::Converged;
                }
                break;
            }
            lambda *= 10.0;
        }

        if !accepted {
            status = SolverStatus::NumericalFailure;
            break;
        }
        if status == SolverStatus::Converged {
            break;
        }
    }

    // covariance from the undamped normal equations at the solution
    let covariance = if m > n {
        problem.jacobian(&params, &mut jacobian);
        let hessian = jacobian.transpose() * &jacobian;
        hessian
            .try_inverse()
            .map(|inv| inv * (objective / (m - n) as f64))
    } else {
        None
    };

    LeastSquaresSolution {
        parameters: params,
        objective,
        status,
        iterations,
        covariance,
    }
}
