//! Kinematics term for differential-drive robots.

use std::io::{Read, Write};
use std::sync::Arc;

use nalgebra::{Matrix2, Matrix2x3, Vector2};

use super::{
    assert_error_finite, nonholonomic_violation, read_real, sign, JacobianMode, KinematicTerm,
};
use crate::core::{
    penalty_bound_from_below, penalty_bound_from_below_derivative, KinematicsConfig, Pose, PoseId,
};
use crate::error::KinematicsResult;

/// Binary cost term enforcing differential-drive kinematics between two
/// consecutive trajectory poses.
///
/// # Residual
///
/// With `delta = pose2.position() - pose1.position()`:
///
/// ```text
/// error[0] = |(cos t1 + cos t2) * delta.y - (sin t1 + sin t2) * delta.x|
/// error[1] = penalty_bound_from_below(delta . heading1, 0, 0)
/// ```
///
/// `error[0]` is a geometric discretization of the no-lateral-slip constraint
/// between the two headings. `error[1]` is zero for forward or stationary
/// motion and equals the backward distance otherwise; its margin is fixed at
/// zero so the first segment of a trajectory is not artificially pushed
/// forward.
///
/// A high information weight on component 0 (~1000) enforces the
/// nonholonomic constraint; a weight around 1 on component 1 allows backward
/// driving but penalizes it slightly.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use kinematic_factors::{DiffDriveKinematicsTerm, KinematicTerm, KinematicsConfig, Pose};
///
/// let mut term = DiffDriveKinematicsTerm::new([0, 1]);
/// term.set_config(Arc::new(KinematicsConfig::new(1.0).unwrap()));
///
/// // One meter straight ahead: kinematically feasible
/// let error = term.compute_error(&Pose::new(0.0, 0.0, 0.0), &Pose::new(1.0, 0.0, 0.0));
/// assert_eq!(error, nalgebra::Vector2::new(0.0, 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct DiffDriveKinematicsTerm {
    pose_keys: [PoseId; 2],
    config: Option<Arc<KinematicsConfig>>,
    information: Matrix2<f64>,
    measurement: f64,
    jacobian_mode: JacobianMode,
}

impl DiffDriveKinematicsTerm {
    /// Create a term over the given pose handles, relying on solver-side
    /// numeric differentiation.
    pub fn new(pose_keys: [PoseId; 2]) -> Self {
        Self::with_jacobian_mode(pose_keys, JacobianMode::Numeric)
    }

    /// Create a term with an explicit differentiation strategy.
    pub fn with_jacobian_mode(pose_keys: [PoseId; 2], jacobian_mode: JacobianMode) -> Self {
        Self {
            pose_keys,
            config: None,
            information: Matrix2::identity(),
            measurement: 0.0,
            jacobian_mode,
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
                "DiffDriveKinematicsTerm over poses {:?} evaluated before set_config; \
                 bind a KinematicsConfig when assembling the graph",
                self.pose_keys
            ),
        }
    }
}

impl KinematicTerm for DiffDriveKinematicsTerm {
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
        self.jacobian_mode
    }

    fn compute_error(&self, pose1: &Pose, pose2: &Pose) -> Vector2<f64> {
        self.require_config();

        let delta = pose2.position() - pose1.position();
        let nonholonomic = nonholonomic_violation(pose1, pose2).abs();

        // Positive-drive-direction constraint. Margin 0: anything else pushes
        // the first band poses away from the start.
        let drive_projection = delta.dot(&pose1.heading());
        let backward_drive = penalty_bound_from_below(drive_projection, 0.0, 0.0);

        let error = Vector2::new(nonholonomic, backward_drive);
        assert_error_finite("DiffDriveKinematicsTerm", &error);
        error
    }

    fn linearize_oplus(&self, pose1: &Pose, pose2: &Pose) -> Option<[Matrix2x3<f64>; 2]> {
        if self.jacobian_mode != JacobianMode::Analytic {
            return None;
        }
        self.require_config();

        let delta = pose2.position() - pose1.position();
        let (sin1, cos1) = pose1.theta().sin_cos();
        let (sin2, cos2) = pose2.theta().sin_cos();
        let sin_sum = sin1 + sin2;
        let cos_sum = cos1 + cos2;

        // Subgradient of the absolute value; zero exactly at the kink.
        let nh_sign = sign(nonholonomic_violation(pose1, pose2));

        let drive_projection = delta.x * cos1 + delta.y * sin1;
        let drive_dev = penalty_bound_from_below_derivative(drive_projection, 0.0, 0.0);

        let jacobian1 = Matrix2x3::new(
            sin_sum * nh_sign,
            -cos_sum * nh_sign,
            (-delta.y * sin1 - delta.x * cos1) * nh_sign,
            -cos1 * drive_dev,
            -sin1 * drive_dev,
            (-sin1 * delta.x + cos1 * delta.y) * drive_dev,
        );
        let jacobian2 = Matrix2x3::new(
            -sin_sum * nh_sign,
            cos_sum * nh_sign,
            (-sin2 * delta.y - cos2 * delta.x) * nh_sign,
            cos1 * drive_dev,
            sin1 * drive_dev,
            0.0,
        );

        Some([jacobian1, jacobian2])
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
