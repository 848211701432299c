//! Kinematic cost terms connecting consecutive trajectory poses.
//!
//! Each term is a binary edge over two poses `(pose1, pose2)` of the
//! discretized trajectory, ordered along it, and produces a 2-component
//! residual. The first component is always the nonholonomic (no-lateral-slip)
//! violation; the second is robot-model specific:
//!
//! - [`DiffDriveKinematicsTerm`]: backward-drive penalty
//! - [`CarlikeKinematicsTerm`]: minimum-turning-radius penalty
//!
//! Terms hold only [`PoseId`] handles; the owning
//! [`crate::core::TrajectoryGraph`] resolves them and maintains the
//! pose-to-term incidence tables. The external least-squares solver calls
//! [`KinematicTerm::compute_error`] every iteration and, for terms that carry
//! one, folds the analytic Jacobian from [`KinematicTerm::linearize_oplus`]
//! into its normal equations.

use std::fmt;
use std::io::{Read, Write};

use nalgebra::{Matrix2, Matrix2x3, Vector2};

use crate::core::{Pose, PoseId};
use crate::error::{KinematicsError, KinematicsResult};

pub mod carlike;
pub mod diff_drive;

pub use carlike::CarlikeKinematicsTerm;
pub use diff_drive::DiffDriveKinematicsTerm;

/// Differentiation strategy for a term, chosen at construction.
///
/// `Analytic` terms populate their own Jacobian blocks through
/// [`KinematicTerm::linearize_oplus`]; `Numeric` terms return `None` there
/// and rely on the solver's numeric or automatic differentiation of
/// [`KinematicTerm::compute_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JacobianMode {
    Analytic,
    Numeric,
}

/// Capability interface exposed to the external graph solver.
///
/// Implementations must be pure with respect to evaluation: for fixed poses
/// and configuration, `compute_error` returns identical results on every
/// call and mutates nothing, so distinct term instances may be evaluated
/// concurrently against shared poses.
pub trait KinematicTerm: fmt::Debug + Send + Sync {
    /// Handles of the two poses this term depends on, ordered along the
    /// trajectory: `[earlier, later]`.
    fn pose_keys(&self) -> [PoseId; 2];

    /// Diagonal 2x2 information weight scaling each residual component.
    fn information(&self) -> &Matrix2<f64>;

    /// Replace the information weight (solver/configuration supplied).
    fn set_information(&mut self, information: Matrix2<f64>);

    /// The differentiation strategy this term was built with.
    fn jacobian_mode(&self) -> JacobianMode;

    /// Recompute the 2-component residual from the current pose estimates.
    ///
    /// # Panics
    ///
    /// Panics if no configuration is bound to the term, or if any residual
    /// component comes out non-finite (malformed upstream pose data). Both
    /// are graph-assembly programming errors, never silently defaulted.
    fn compute_error(&self, pose1: &Pose, pose2: &Pose) -> Vector2<f64>;

    /// Analytic Jacobian blocks `[d_error/d_pose1, d_error/d_pose2]`, each
    /// 2x3 over `(x, y, theta)`.
    ///
    /// Returns `None` for terms built with [`JacobianMode::Numeric`]; the
    /// solver then differentiates `compute_error` itself.
    fn linearize_oplus(&self, pose1: &Pose, pose2: &Pose) -> Option<[Matrix2x3<f64>; 2]>;

    /// Consume the persisted fields from a stream, in fixed order: a scalar
    /// measurement placeholder, then the `[0,0]` entry of the information
    /// weight.
    fn read(&mut self, reader: &mut dyn Read) -> KinematicsResult<()>;

    /// Emit the `[0,0]` information entry and the two current residual
    /// components. Diagnostic/persistence format only; not required for
    /// correctness of optimization.
    fn write(&self, pose1: &Pose, pose2: &Pose, writer: &mut dyn Write) -> KinematicsResult<()>;
}

/// Signed discretized no-lateral-slip violation between two poses.
///
/// The residual uses its absolute value; the sign feeds the analytic
/// Jacobian of the absolute-value term.
pub(crate) fn nonholonomic_violation(pose1: &Pose, pose2: &Pose) -> f64 {
    let delta = pose2.position() - pose1.position();
    (pose1.theta().cos() + pose2.theta().cos()) * delta.y
        - (pose1.theta().sin() + pose2.theta().sin()) * delta.x
}

/// Sign with `sign(0) = 0`, matching the subgradient convention used for the
/// absolute-value term at its kink.
pub(crate) fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Fail fast on non-finite residuals: these indicate malformed upstream pose
/// data (e.g. a NaN pose) and must not be clamped or swallowed.
pub(crate) fn assert_error_finite(term: &str, error: &Vector2<f64>) {
    assert!(
        error[0].is_finite() && error[1].is_finite(),
        "{term}::compute_error produced a non-finite residual: error[0]={}, error[1]={}; \
         upstream pose data is malformed",
        error[0],
        error[1]
    );
}

/// Read one whitespace-delimited real from a stream.
pub(crate) fn read_real(reader: &mut dyn Read) -> KinematicsResult<f64> {
    let mut byte = [0u8; 1];
    let first = loop {
        if reader.read(&mut byte)? == 0 {
            return Err(KinematicsError::Io(
                "unexpected end of stream while reading a real".to_string(),
            ));
        }
        if !byte[0].is_ascii_whitespace() {
            break byte[0];
        }
    };

    let mut token = vec![first];
    loop {
        match reader.read(&mut byte)? {
            0 => break,
            _ if byte[0].is_ascii_whitespace() => break,
            _ => token.push(byte[0]),
        }
    }

    let text = std::str::from_utf8(&token)
        .map_err(|e| KinematicsError::Io(format!("non-UTF8 token in stream: {e}")))?;
    Ok(text.parse::<f64>()?)
}
