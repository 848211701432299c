//! Kinematic-feasibility cost terms for graph-based trajectory optimization
//! of wheeled mobile robots.
//!
//! A discretized trajectory is a sequence of poses `(x, y, theta)` owned by a
//! [`core::TrajectoryGraph`]. Each kinematics term is a binary cost edge over
//! two consecutive poses producing a 2-component residual that penalizes
//! violations of the vehicle motion model:
//!
//! - [`factors::DiffDriveKinematicsTerm`]: nonholonomic (no-lateral-slip)
//!   violation plus a backward-drive penalty for differential-drive robots.
//! - [`factors::CarlikeKinematicsTerm`]: the same nonholonomic violation plus
//!   a minimum-turning-radius penalty for car-like (Ackermann) robots.
//!
//! The nonlinear least-squares solver that owns the pose variables, the
//! iteration loop and the sparse linear algebra is an external collaborator.
//! This crate contributes only the cost-term definitions, their analytic
//! derivatives where available, and the stream-based read/write hooks.

pub mod core;
pub mod error;
pub mod factors;
pub mod logger;

pub use crate::core::{
    normalize_theta, penalty_bound_from_below, penalty_bound_from_below_derivative,
    KinematicsConfig, Pose, PoseId, TermId, TrajectoryGraph,
};
pub use error::{KinematicsError, KinematicsResult};
pub use factors::{CarlikeKinematicsTerm, DiffDriveKinematicsTerm, JacobianMode, KinematicTerm};
pub use logger::{init_logger, init_logger_with_level};
