//! Kinematics term for car-like (Ackermann) robots.

use std::io::{Read, Write};
use std::sync::Arc;

use nalgebra::{Matrix2, Matrix2x3, Vector2};
use tracing::trace;

use super::{assert_error_finite, nonholonomic_violation, read_real, JacobianMode, KinematicTerm};
use crate::core::{normalize_theta, penalty_bound_from_below, KinematicsConfig, Pose, PoseId};
use crate::error::KinematicsResult;

/// Binary cost term enforcing car-like kinematics between two consecutive
/// trajectory poses.
///
/// The nonholonomic component `error[0]` is identical to
/// [`super::DiffDriveKinematicsTerm`]. Instead of a backward-drive penalty,
/// the second component bounds the segment's implied turning radius from
/// below:
///
/// ```text
/// dtheta   = normalize_theta(t2 - t1)
/// error[1] = 0                                                if dtheta == 0
///          = penalty_bound_from_below(|delta| / |dtheta|,
///                                     min_turning_radius, 0)  otherwise
/// ```
///
/// A zero heading change is a straight segment: zero turning means zero
/// violation, not an undefined radius, so the degenerate branch is a defined
/// zero-cost case rather than an error. The bound carries no margin; callers
/// needing slack inflate `min_turning_radius` itself.
///
/// This term provides no analytic Jacobian and relies on the solver's
/// numeric or automatic differentiation.
#[derive(Debug, Clone)]
pub struct CarlikeKinematicsTerm {
    pose_keys: [PoseId; 2],
    config: Option<Arc<KinematicsConfig>>,
    information: Matrix2<f64>,
    measurement: f64,
}

impl CarlikeKinematicsTerm {
    /// Create a term over the given pose handles.
    pub fn new(pose_keys: [PoseId; 2]) -> Self {
        Self {
            pose_keys,
            config: None,
            information: Matrix2::identity(),
            measurement: 0.0,
        }
    }

    /// Bind the shared kinematic configuration. Must happen before the first
    /// evaluation.
    pub fn set_config(&mut self, config: Arc<KinematicsConfig>) {
        self.config = Some(config);
    }

    /// Scalar measurement placeholder carried for the stream hooks.
    pub fn measurement(&self) -> f64 {
        self.measurement
    }

    fn require_config(&self) -> &KinematicsConfig {
        match &self.config {
            Some(config) => config,
            None => panic!(
                "CarlikeKinematicsTerm over poses {:?} evaluated before set_config; \
                 bind a KinematicsConfig when assembling the graph",
                self.pose_keys
            ),
        }
    }
}

impl KinematicTerm for CarlikeKinematicsTerm {
    fn pose_keys(&self) -> [PoseId; 2] {
        self.pose_keys
    }

    fn information(&self) -> &Matrix2<f64> {
        &self.information
    }

    fn set_information(&mut self, information: Matrix2<f64>) {
        self.information = information;
    }

    fn jacobian_mode(&self) -> JacobianMode {
        JacobianMode::Numeric
    }

    fn compute_error(&self, pose1: &Pose, pose2: &Pose) -> Vector2<f64> {
        let config = self.require_config();

        let delta = pose2.position() - pose1.position();
        let nonholonomic = nonholonomic_violation(pose1, pose2).abs();

        let delta_theta = normalize_theta(pose2.theta() - pose1.theta());
        let radius_violation = if delta_theta == 0.0 {
            // Straight segment: zero turning is zero violation
            0.0
        } else {
            penalty_bound_from_below(
                delta.norm() / delta_theta.abs(),
                config.min_turning_radius(),
                0.0,
            )
        };

        let error = Vector2::new(nonholonomic, radius_violation);
        trace!(
            delta_theta,
            error_nonholonomic = error[0],
            error_turning_radius = error[1],
            "carlike kinematics residual"
        );
        assert_error_finite("CarlikeKinematicsTerm", &error);
        error
    }

    fn linearize_oplus(&self, _pose1: &Pose, _pose2: &Pose) -> Option<[Matrix2x3<f64>; 2]> {
        None
    }

    fn read(&mut self, reader: &mut dyn Read) -> KinematicsResult<()> {
        self.measurement = read_real(reader)?;
        self.information[(0, 0)] = read_real(reader)?;
        Ok(())
    }

    fn write(&self, pose1: &Pose, pose2: &Pose, writer: &mut dyn Write) -> KinematicsResult<()> {
        let error = self.compute_error(pose1, pose2);
        write!(
            writer,
            "{} {} {}",
            self.information[(0, 0)],
            error[0],
            error[1]
        )?;
        Ok(())
    }
}
