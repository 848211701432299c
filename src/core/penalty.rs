//! One-sided bound penalties for inequality constraints.
//!
//! Least-squares solvers minimize smooth residuals, so inequality constraints
//! of the form `value >= bound` enter the objective as non-negative penalty
//! residuals: zero everywhere the constraint holds, growing linearly with the
//! shortfall where it is violated. Each penalty comes with its derivative so
//! that terms with analytic Jacobians can differentiate through it.
//!
//! The `margin` argument demands slack beyond the raw bound: the penalty is
//! zero only once `value >= lower_bound + margin`. A margin of `0` enforces
//! the bound exactly.
//!
//! # Example
//!
//! ```
//! use kinematic_factors::{penalty_bound_from_below, penalty_bound_from_below_derivative};
//!
//! // Feasible: value above the bound
//! assert_eq!(penalty_bound_from_below(2.0, 1.0, 0.0), 0.0);
//! assert_eq!(penalty_bound_from_below_derivative(2.0, 1.0, 0.0), 0.0);
//!
//! // Violated: penalty equals the shortfall
//! assert_eq!(penalty_bound_from_below(0.25, 1.0, 0.0), 0.75);
//! assert_eq!(penalty_bound_from_below_derivative(0.25, 1.0, 0.0), -1.0);
//! ```

/// Penalize `value` dropping below `lower_bound + margin`.
///
/// Returns `0` when `value >= lower_bound + margin`, otherwise the violation
/// magnitude `(lower_bound + margin) - value`. Continuous and exactly zero at
/// the boundary.
pub fn penalty_bound_from_below(value: f64, lower_bound: f64, margin: f64) -> f64 {
    if value >= lower_bound + margin {
        0.0
    } else {
        -value + (lower_bound + margin)
    }
}

/// Derivative of [`penalty_bound_from_below`] with respect to `value`.
///
/// `0` in the feasible region, `-1` in the violated region.
pub fn penalty_bound_from_below_derivative(value: f64, lower_bound: f64, margin: f64) -> f64 {
    if value >= lower_bound + margin {
        0.0
    } else {
        -1.0
    }
}
