//! Gradient-free Nelder–Mead simplex minimizer

use super::SolverStatus;
use nalgebra::DVector;

/// Reflection coefficient
const ALPHA: f64 = 1.0;
/// Expansion coefficient
const GAMMA: f64 = 2.0;
/// Contraction coefficient
const RHO: f64 = 0.5;
/// Shrink coefficient
const SIGMA: f64 = 0.5;

/// Relative perturbation used to build the initial simplex
const INITIAL_DELTA: f64 = 0.05;
/// Absolute perturbation for coordinates that start at zero
const INITIAL_DELTA_ZERO: f64 = 0.00025;

/// Options for [`minimize`]
#[derive(Debug, Clone)]
pub struct NelderMeadOptions {
    /// Iteration cap; `None` uses 200 × dimension
    pub max_iterations: Option<usize>,
    /// Convergence threshold on the simplex spread in parameter space
    pub x_tolerance: f64,
    /// Convergence threshold on the spread of objective values
    pub f_tolerance: f64,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            max_iterations: None,
            x_tolerance: 1e-8,
            f_tolerance: 1e-12,
        }
    }
}

/// Result report of [`minimize`]
#[derive(Debug, Clone)]
pub struct MinimizeResult {
    /// Best parameter vector found
    pub parameters: DVector<f64>,
    /// Objective value at `parameters`
    pub objective: f64,
    /// Termination status
    pub status: SolverStatus,
    /// Iterations performed
    pub iterations: usize,
    /// Number of objective evaluations
    pub evaluations: usize,
}

/// Minimize a scalar objective with the Nelder–Mead simplex method
///
/// Entirely derivative-free, which makes it the right tool for objectives
/// that are only piecewise smooth. The initial simplex perturbs each
/// coordinate of the guess by a fixed relative amount, so repeated calls
/// with identical input walk an identical path. The solver converges when
/// both the parameter and objective spreads of the simplex fall below
/// their tolerances; a candidate evaluating to NaN is never preferred
/// over the incumbent vertices.
pub fn minimize<F>(
    objective: F,
    initial: &DVector<f64>,
    options: &NelderMeadOptions,
) -> MinimizeResult
where
    F: Fn(&DVector<f64>) -> f64,
{
    let dim = initial.len();
    let max_iterations = options.max_iterations.unwrap_or(200 * dim.max(1));

    let mut evaluations = 0usize;
    let mut eval = |x: &DVector<f64>| {
        evaluations += 1;
        objective(x)
    };

    // initial simplex: the guess plus one perturbed vertex per coordinate
    let mut simplex: Vec<(DVector<f64>, f64)> = Vec::with_capacity(dim + 1);
    let f0 = eval(initial);
    simplex.push((initial.clone(), f0));
    for k in 0..dim {
        let mut vertex = initial.clone();
        if vertex[k] != 0.0 {
            vertex[k] *= 1.0 + INITIAL_DELTA;
        } else {
            vertex[k] = INITIAL_DELTA_ZERO;
        }
        let f = eval(&vertex);
        simplex.push((vertex, f));
    }
    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut iterations = 0usize;
    let mut status = SolverStatus::MaxIterationsReached;

    while iterations < max_iterations {
        let f_spread = simplex[1..]
            .iter()
            .map(|(_, f)| (f - simplex[0].1).abs())
            .fold(0.0, f64::max);
        let x_spread = simplex[1..]
            .iter()
            .map(|(x, _)| (x - &simplex[0].0).amax())
            .fold(0.0, f64::max);
        if f_spread <= options.f_tolerance && x_spread <= options.x_tolerance {
            status = SolverStatus::Converged;
            break;
        }

        iterations += 1;

        // centroid of all vertices except the worst
        let mut centroid = DVector::<f64>::zeros(dim);
        for (x, _) in &simplex[..dim] {
            centroid += x;
        }
        centroid /= dim as f64;

        let f_best = simplex[0].1;
        let f_second_worst = simplex[dim - 1].1;
        let f_worst = simplex[dim].1;

        let reflected = &centroid + (&centroid - &simplex[dim].0) * ALPHA;
        let f_reflected = eval(&reflected);

        if f_reflected < f_best {
            let expanded = &centroid + (&reflected - &centroid) * GAMMA;
            let f_expanded = eval(&expanded);
            if f_expanded < f_reflected {
                simplex[dim] = (expanded, f_expanded);
            } else {
                simplex[dim] = (reflected, f_reflected);
            }
        } else if f_reflected < f_second_worst {
            simplex[dim] = (reflected, f_reflected);
        } else {
            let mut shrink = false;
            if f_reflected < f_worst {
                // outside contraction
                let contracted = &centroid + (&reflected - &centroid) * RHO;
                let f_contracted = eval(&contracted);
                if f_contracted <= f_reflected {
                    simplex[dim] = (contracted, f_contracted);
                } else {
                    shrink = true;
                }
            } else {
                // inside contraction
                let contracted = &centroid + (&simplex[dim].0 - &centroid) * RHO;
                let f_contracted = eval(&contracted);
                if f_contracted < f_worst {
                    simplex[dim] = (contracted, f_contracted);
                } else {
                    shrink = true;
                }
            }

            if shrink {
                let best = simplex[0].0.clone();
                for entry in simplex.iter_mut().skip(1) {
                    let shrunk = &best + (&entry.0 - &best) * SIGMA;
                    entry.0 = shrunk;
                    entry.1 = eval(&entry.0);
                }
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    }

    MinimizeResult {
        parameters: simplex[0].0.clone(),
        objective: simplex[0].1,
        status,
        iterations,
        evaluations,
    }
}
