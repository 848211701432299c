//! Core building blocks: poses, kinematic configuration, bound penalties and
//! the trajectory graph container that owns the pose/term relation tables.

pub mod config;
pub mod graph;
pub mod penalty;
pub mod pose;

pub use config::KinematicsConfig;
pub use graph::{PoseId, TermId, TrajectoryGraph};
pub use penalty::{penalty_bound_from_below, penalty_bound_from_below_derivative};
pub use pose::{normalize_theta, Pose};
